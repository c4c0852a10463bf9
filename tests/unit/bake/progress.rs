use std::sync::Mutex;

use super::*;

fn ev(completed: usize) -> ProgressEvent {
    ProgressEvent {
        stage: BakeStage::Composite,
        completed,
        total: 4,
    }
}

#[test]
fn closures_are_progress_sinks() {
    let seen = Mutex::new(Vec::new());
    let sink = |e: ProgressEvent| seen.lock().unwrap().push(e.completed);
    sink.report(ev(1));
    sink.report(ev(2));
    assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
}

#[test]
fn no_progress_ignores_events() {
    NoProgress.report(ev(1));
}

#[test]
fn channel_progress_drops_when_full() {
    let (sink, rx) = ChannelProgress::bounded(2);
    for i in 1..=5 {
        sink.report(ev(i));
    }
    let got: Vec<usize> = rx.try_iter().map(|e| e.completed).collect();
    assert_eq!(got, vec![1, 2]);
}

#[test]
fn channel_progress_survives_dropped_receiver() {
    let (sink, rx) = ChannelProgress::bounded(1);
    drop(rx);
    sink.report(ev(1));
}
