use lazylife_core::db::open_db;
use lazylife_core::db::open_db_in_memory;
use lazylife_core::model::date_key::{epoch_ms_at_midnight, month_days};
use lazylife_core::service::assignment_service::due_in_month;
use lazylife_core::service::checklist_service::completion_summary;
use lazylife_core::service::habit_service::completed_days_in_month;
use lazylife_core::{
    AssignmentService, BindingError, ChecklistService, DateKey, HabitService, NoteService,
    NotificationLevel, OwnerId, ProgressFlag, RecordError, RecordingNotifier, SqliteDocumentStore,
};

fn alice() -> OwnerId {
    OwnerId::parse("alice").unwrap()
}

#[test]
fn habit_completion_toggles_and_month_view() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut habits = HabitService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();

    habits.add_habit(Some(&owner), "Meditate").unwrap();
    let habit = habits.habits(Some(&owner)).unwrap().remove(0);

    let june_first = DateKey::parse("2025-06-01").unwrap();
    let june_third = DateKey::parse("2025-06-03").unwrap();
    habits
        .toggle_completion(Some(&owner), &habit, june_first)
        .unwrap();
    let habit = habits.habits(Some(&owner)).unwrap().remove(0);
    habits
        .toggle_completion(Some(&owner), &habit, june_third)
        .unwrap();
    let habit = habits.habits(Some(&owner)).unwrap().remove(0);

    let days = month_days(2025, 6).unwrap();
    assert_eq!(days.len(), 30);
    let done: Vec<DateKey> = days
        .into_iter()
        .filter(|day| habit.is_completed_on(*day))
        .collect();
    assert_eq!(done, vec![june_first, june_third]);
    assert_eq!(completed_days_in_month(&habit, 2025, 6).len(), 2);

    let next = habits
        .toggle_completion(Some(&owner), &habit, june_first)
        .unwrap();
    assert!(!next.contains_key(&june_first));
    let habit = habits.habits(Some(&owner)).unwrap().remove(0);
    assert_eq!(completed_days_in_month(&habit, 2025, 6), vec![june_third]);
}

#[test]
fn habit_rename_keeps_completions() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut habits = HabitService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();
    let day = DateKey::parse("2025-02-14").unwrap();

    let id = habits.add_habit(Some(&owner), "Run").unwrap();
    let habit = habits.habits(Some(&owner)).unwrap().remove(0);
    habits.toggle_completion(Some(&owner), &habit, day).unwrap();
    habits.rename_habit(Some(&owner), &id, "Run 5k").unwrap();

    let habit = habits.habits(Some(&owner)).unwrap().remove(0);
    assert_eq!(habit.text, "Run 5k");
    assert!(habit.is_completed_on(day));

    habits.delete_habit(Some(&owner), &id).unwrap();
    assert!(habits.habits(Some(&owner)).unwrap().is_empty());
}

#[test]
fn checklist_toggle_flips_completion() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut checklist =
        ChecklistService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();

    checklist.add_item(Some(&owner), "Drink water").unwrap();
    checklist.add_item(Some(&owner), "Take vitamins").unwrap();
    let items = checklist.items(Some(&owner)).unwrap();
    assert_eq!(completion_summary(&items), (0, 2));

    assert!(checklist.toggle_item(Some(&owner), &items[0]).unwrap());
    let items = checklist.items(Some(&owner)).unwrap();
    assert_eq!(items[0].text, "Drink water");
    assert!(items[0].completed);
    assert_eq!(completion_summary(&items), (1, 2));

    assert!(!checklist.toggle_item(Some(&owner), &items[0]).unwrap());
    checklist.delete_item(Some(&owner), &items[1].id).unwrap();
    let items = checklist.items(Some(&owner)).unwrap();
    assert_eq!(completion_summary(&items), (0, 1));
}

#[test]
fn assignment_progress_flags_are_independent() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut assignments =
        AssignmentService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();
    let due = epoch_ms_at_midnight(DateKey::parse("2025-06-01").unwrap().date());

    assignments
        .add_assignment(Some(&owner), "Essay", due)
        .unwrap();
    let essay = assignments.assignments(Some(&owner)).unwrap().remove(0);
    assert!(ProgressFlag::ALL.iter().all(|flag| !essay.flag(*flag)));

    assert!(assignments
        .toggle_progress(Some(&owner), &essay, ProgressFlag::HandedIn)
        .unwrap());
    let essay = assignments.assignments(Some(&owner)).unwrap().remove(0);
    assert!(essay.handed_in);
    assert!(!essay.started);
    assert!(!essay.in_progress);

    let all = assignments.assignments(Some(&owner)).unwrap();
    assert_eq!(due_in_month(&all, 2025, 6).len(), 1);
    assert!(due_in_month(&all, 2025, 7).is_empty());

    assignments
        .delete_assignment(Some(&owner), &essay.id)
        .unwrap();
    assert!(assignments.assignments(Some(&owner)).unwrap().is_empty());
}

#[test]
fn note_edit_preview_and_checkbox_toggle() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut notes = NoteService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();

    let id = notes
        .add_note(
            Some(&owner),
            "Groceries",
            "![cover](basket.png)\n- [ ] milk\n- [ ] eggs",
        )
        .unwrap();

    let previews = notes.previews(Some(&owner)).unwrap();
    assert_eq!(previews.len(), 1);
    assert_eq!(previews[0].id, id);
    assert_eq!(previews[0].preview_image.as_deref(), Some("basket.png"));

    let note = notes.notes(Some(&owner)).unwrap().remove(0);
    let content = notes.toggle_checkbox(Some(&owner), &note, 2).unwrap();
    assert_eq!(content, "![cover](basket.png)\n- [ ] milk\n- [x] eggs");

    let note = notes.notes(Some(&owner)).unwrap().remove(0);
    assert_eq!(note.content, content);
    assert_eq!(note.title, "Groceries");

    notifier.drain();
    let err = notes.toggle_checkbox(Some(&owner), &note, 0).unwrap_err();
    assert!(matches!(
        err,
        BindingError::InvalidInput(RecordError::NotACheckbox { line: 0 })
    ));
    let notes_sent = notifier.drain();
    assert_eq!(notes_sent.len(), 1);
    assert_eq!(notes_sent[0].level, NotificationLevel::Failure);
    assert_eq!(notes_sent[0].message, "Failed to update note.");
    let unchanged = notes.notes(Some(&owner)).unwrap().remove(0);
    assert_eq!(unchanged.content, content);

    notes
        .update_note(Some(&owner), &id, "Shopping", "- [x] milk")
        .unwrap();
    let note = notes.notes(Some(&owner)).unwrap().remove(0);
    assert_eq!(note.title, "Shopping");
    assert_eq!(note.content, "- [x] milk");

    notes.delete_note(Some(&owner), &id).unwrap();
    assert!(notes.notes(Some(&owner)).unwrap().is_empty());
}

#[test]
fn checkbox_toggle_while_signed_out_requires_authentication() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut notes = NoteService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();

    notes
        .add_note(Some(&owner), "Chores", "- [ ] laundry")
        .unwrap();
    let note = notes.notes(Some(&owner)).unwrap().remove(0);
    notifier.drain();

    let err = notes.toggle_checkbox(None, &note, 0).unwrap_err();
    assert!(err.is_authentication_required());
    assert_eq!(notifier.len(), 1);

    let err = notes.toggle_checkbox(None, &note, 7).unwrap_err();
    assert!(err.is_authentication_required());
    assert_eq!(notifier.len(), 2);

    let note = notes.notes(Some(&owner)).unwrap().remove(0);
    assert_eq!(note.content, "- [ ] laundry");
}

#[test]
fn notes_are_listed_oldest_first() {
    let conn = open_db_in_memory().unwrap();
    let notifier = RecordingNotifier::new();
    let mut notes = NoteService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let owner = alice();

    for title in ["Monday", "Tuesday", "Wednesday"] {
        notes.add_note(Some(&owner), title, "").unwrap();
    }

    let titles: Vec<String> = notes
        .notes(Some(&owner))
        .unwrap()
        .into_iter()
        .map(|note| note.title)
        .collect();
    assert_eq!(titles, vec!["Monday", "Tuesday", "Wednesday"]);
}

#[test]
fn records_survive_reopening_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lazylife.db");
    let owner = alice();
    let notifier = RecordingNotifier::new();

    {
        let conn = open_db(&path).unwrap();
        let mut checklist =
            ChecklistService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
        checklist.add_item(Some(&owner), "Persist me").unwrap();
    }

    let conn = open_db(&path).unwrap();
    let mut checklist =
        ChecklistService::new(SqliteDocumentStore::try_new(&conn).unwrap(), &notifier);
    let items = checklist.items(Some(&owner)).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].text, "Persist me");
}
