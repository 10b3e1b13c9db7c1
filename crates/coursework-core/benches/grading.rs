use criterion::{black_box, criterion_group, criterion_main, Criterion};

use coursework_core::grading::{grade, Answer, Submission};
use coursework_core::task::{parse_task_config_str, TaskConfig};

fn bench_grading(c: &mut Criterion) {
    let mut group = c.benchmark_group("grading");

    for n in [5, 50, 500] {
        let task = generate_quiz(n);
        let submission = generate_submission(n);

        group.bench_function(format!("{n}_problems"), |b| {
            b.iter(|| grade(black_box(&task), black_box(&submission)))
        });
    }

    group.finish();
}

/// A quiz alternating multiple-choice, match, and code problems.
fn generate_quiz(n: usize) -> TaskConfig {
    let mut s = String::from("name: Bench\nenvironment_type: mcq\nproblems:\n");
    for i in 0..n {
        match i % 3 {
            0 => s.push_str(&format!(
                "  p{i}:\n    type: multiple_choice\n    choices:\n      - {{text: a, valid: true}}\n      - {{text: b, valid: false}}\n      - {{text: c, valid: true}}\n      - {{text: d, valid: false}}\n"
            )),
            1 => s.push_str(&format!("  p{i}:\n    type: match\n    answer: \"Answer {i}\"\n")),
            _ => s.push_str(&format!("  p{i}:\n    type: code\n    language: python\n")),
        }
    }
    parse_task_config_str(&s, "bench.yaml".as_ref()).expect("generated quiz parses")
}

fn generate_submission(n: usize) -> Submission {
    (0..n).fold(Submission::default(), |sub, i| match i % 3 {
        0 => sub.with_answer(format!("p{i}"), Answer::Selection(vec![2, 0])),
        1 => sub.with_answer(format!("p{i}"), Answer::Text(format!("  answer {i} "))),
        _ => sub,
    })
}

criterion_group!(benches, bench_grading);
criterion_main!(benches);
