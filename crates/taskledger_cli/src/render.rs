//! Plain-text rendering of records, boards and reports.

use taskledger_core::{TaskBoard, TaskRecord, TaskReport, TaskRepository};

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "-"
    } else {
        value
    }
}

pub fn print_records(title: &str, records: &[TaskRecord]) {
    println!("{title} ({})", records.len());
    for record in records {
        println!(
            "  {} | {} | {} | {} | {} | {} | {} | {}",
            record.id.unwrap_or_default(),
            record.national_id,
            record.display_name(),
            record.course,
            record.shift,
            or_dash(&record.pending_action),
            record.created_at,
            or_dash(&record.completed_at)
        );
    }
}

pub fn print_board<R: TaskRepository>(
    board: &TaskBoard<R>,
    show_pending: bool,
    show_completed: bool,
) {
    if show_pending {
        print_records("Pending", board.pending());
    }
    if show_completed {
        print_records("Completed", board.completed());
    }
    println!("{}", board.status_line());
}

pub fn print_record(record: &TaskRecord) {
    println!("id: {}", record.id.unwrap_or_default());
    println!("national id: {}", record.national_id);
    println!("first name: {}", record.first_name);
    println!("last name: {}", record.last_name);
    println!("course: {}", record.course);
    println!("shift: {}", record.shift);
    println!("pending action: {}", or_dash(&record.pending_action));
    println!("created at: {}", record.created_at);
    println!("completed at: {}", or_dash(&record.completed_at));
    println!("status: {}", record.status);
}

pub fn print_report(report: &TaskReport) {
    if report.is_empty() {
        println!("No records yet");
        return;
    }

    println!("Total: {}", report.total);
    println!("Pending: {} ({}%)", report.pending, report.pending_percent());
    println!(
        "Completed: {} ({}%)",
        report.completed,
        report.completed_percent()
    );
    println!("By course:");
    for (course, count) in &report.by_course {
        println!("  {course}: {count}");
    }
    println!("By shift:");
    for (shift, count) in &report.by_shift {
        println!("  {shift}: {count}");
    }
}
