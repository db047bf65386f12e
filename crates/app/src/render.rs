use portal_core::model::{ExamResult, User};
use portal_core::ExamOutcome;
use services::{
    ActivityItem, AdminOverview, DashboardSnapshot, ExamListItem, LessonItem, QuestionView,
};

pub fn dashboard(snap: &DashboardSnapshot) {
    println!("Welcome back, {} ({})", snap.user.name(), snap.user.role());
    println!("Heritage progress: {}%", snap.progress);
    match &snap.next_activity {
        Some(a) => println!("Next activity: {} on {} at {}", a.title(), a.date(), a.location()),
        None => println!("Next activity: none scheduled"),
    }
    match &snap.next_lesson {
        Some(l) => println!(
            "Continue learning: {} ({} lesson(s) left)",
            l.title(),
            snap.incomplete_lessons
        ),
        None => println!("All lessons completed"),
    }
    println!();
    println!("Announcements:");
    for notice in &snap.announcements {
        let flag = if notice.is_urgent() { " [urgent]" } else { "" };
        println!("  {} {}{} - {}", notice.date, notice.title, flag, notice.author);
        println!("    {}", notice.content);
    }
}

pub fn lessons(items: &[LessonItem]) {
    if items.is_empty() {
        println!("No lessons match that level.");
        return;
    }
    for item in items {
        let mark = if item.completed { "x" } else { " " };
        let l = &item.lesson;
        println!(
            "[{mark}] {:<4} {} ({}, {}, {})",
            l.id(),
            l.title(),
            l.level(),
            l.topic(),
            l.year()
        );
        println!("         {}", l.description());
    }
}

pub fn activities(items: &[ActivityItem]) {
    for item in items {
        let a = &item.activity;
        let mark = if item.registered { " [registered]" } else { "" };
        println!("{:<4} {} ({}){mark}", a.id(), a.title(), a.kind());
        println!(
            "     {} at {} - {}/{} ({:.0}% full)",
            a.date(),
            a.location(),
            a.registered_count(),
            a.capacity(),
            item.fill_percent
        );
        if !a.requirements().is_empty() {
            println!("     bring: {}", a.requirements().join(", "));
        }
    }
}

pub fn exams(items: &[ExamListItem]) {
    for exam in items {
        println!(
            "{:<4} {} - {} questions, pass {}%, {} min, {} attempt(s)",
            exam.id,
            exam.title,
            exam.question_count,
            exam.passing_score,
            exam.time_limit_minutes,
            exam.attempts_allowed
        );
    }
}

pub fn question(view: &QuestionView) {
    println!();
    println!(
        "Question {} of {} ({:.0}%)",
        view.number, view.total, view.progress_percent
    );
    println!("{}", view.text);
    for (i, option) in view.options.iter().enumerate() {
        let mark = if view.selected == Some(i) { "*" } else { " " };
        println!(" {mark}{}. {option}", i + 1);
    }
}

pub fn outcome(outcome: &ExamOutcome) {
    let verdict = if outcome.passed() { "PASSED" } else { "NOT PASSED" };
    println!(
        "{verdict}: {}/{} correct, score {:.0}% (pass mark {}%)",
        outcome.correct(),
        outcome.total(),
        outcome.score(),
        outcome.passing_score()
    );
}

pub fn history(results: &[ExamResult]) {
    if results.is_empty() {
        println!("No exams taken yet.");
        return;
    }
    for r in results {
        let verdict = if r.passed { "passed" } else { "failed" };
        println!(
            "{} {:<4} {:>5.1}% {verdict}",
            r.taken_at.format("%Y-%m-%d %H:%M"),
            r.exam_id,
            r.score
        );
    }
}

pub fn admin(overview: &AdminOverview, members: &[User]) {
    println!("Members:          {}", overview.members);
    println!("Lessons:          {}", overview.lessons);
    println!("Activities:       {}", overview.activities);
    println!("Exams:            {}", overview.exams);
    println!("Average progress: {}%", overview.average_progress);
    println!();
    for m in members {
        println!("  {:<4} {:<20} {:<10} {:>3}%", m.id(), m.name(), m.role(), m.progress());
    }
}
