/// Student Table Example
///
/// This example demonstrates:
/// - Loading students from an in-memory record source
/// - Text and hierarchical class/room filters
/// - Sorting and page navigation
/// - Selecting rows and confirming a bulk delete

use clubtable::{Action, Choice, EntityKind, MemorySource, TableController, ViewSnapshot};
use serde_json::json;

fn print_view(view: &ViewSnapshot) {
    println!(
        "   {} of {} students match, page {}/{} {:?}",
        view.total_matching,
        view.total_records,
        view.pagination.current_page,
        view.pagination.total_pages,
        view.pagination.buttons
    );
    for row in &view.rows {
        println!(
            "     [{}] {} {} {} / room {}",
            row["student_id"], row["first_name"], row["last_name"], row["class_name"], row["room_name"]
        );
    }
    if let Some(hint) = view.empty_hint {
        println!("     (empty: {:?})", hint);
    }
    println!();
}

#[tokio::main]
async fn main() {
    println!("=== ClubTable Students Example ===\n");

    // 1. Seed a record source
    println!("1. Seeding 36 students...");
    let first_names = ["Anong", "Boonmee", "Chanida", "Decha", "Ekkachai", "Fah"];
    let rows = (1..=36)
        .map(|i: i64| {
            json!({
                "student_id": 64000 + i,
                "card_code": format!("11037000{:05}", i),
                "first_name": first_names[(i as usize) % first_names.len()],
                "last_name": format!("Family{}", i),
                "class_name": format!("M{}", (i - 1) / 12 + 4),
                "room_name": format!("{}", i % 3 + 1),
            })
        })
        .collect();
    let source = MemorySource::with_rows(EntityKind::Student, rows);

    let mut table = TableController::for_entity(EntityKind::Student);
    table.refresh(&source).await.unwrap();
    print_view(&table.snapshot());

    // 2. Text filter applies only when confirmed
    println!("2. Searching for 'anong'...");
    table.dispatch(Action::SetTextFilter {
        field: "name".to_string(),
        value: "anong".to_string(),
    });
    table.dispatch(Action::ConfirmFilters);
    print_view(&table.snapshot());

    // 3. Class, then room
    println!("3. Class M5, room 2...");
    table.dispatch(Action::SetTextFilter {
        field: "name".to_string(),
        value: String::new(),
    });
    table.dispatch(Action::ConfirmFilters);
    table.dispatch(Action::SetCategoricalFilter {
        field: "class_name".to_string(),
        choice: Choice::Exact("M5".to_string()),
    });
    let view = table.snapshot();
    println!("   room options: {:?}", view.categorical[1].options);
    table.dispatch(Action::SetCategoricalFilter {
        field: "room_name".to_string(),
        choice: Choice::Exact("2".to_string()),
    });
    print_view(&table.snapshot());

    // 4. Sort and page through everything
    println!("4. All students by last name, page 3...");
    table.dispatch(Action::SetCategoricalFilter {
        field: "class_name".to_string(),
        choice: Choice::Any,
    });
    table.dispatch(Action::SetSort { column: "last_name".to_string() });
    table.dispatch(Action::GotoPage { page: 3 });
    print_view(&table.snapshot());

    // 5. Select the page and delete it
    println!("5. Deleting the selected page...");
    table.dispatch(Action::ToggleSelectAll { checked: true });
    if table.request_delete_selected() {
        println!("   confirm deleting {:?} students", table.snapshot().pending_delete);
        let follow_up = table.confirm_delete(&source).await.unwrap();
        table.follow_up(&source, follow_up).await.unwrap();
    }
    for note in table.take_notifications() {
        println!("   {:?}: {} - {}", note.level, note.title, note.text);
    }
    print_view(&table.snapshot());

    println!("=== Example Complete ===");
}
