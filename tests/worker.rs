use std::thread;
use std::time::Duration;

use note_graph::graph::{Classification, index_graph};
use note_graph::notes::Note;
use note_graph::sim::{
    EdgeSpec, Inbound, NodePosition, NodeSpec, Outbound, SimParams, SimParamsPatch, Simulation,
    SimulationWorker, WorkerOptions,
};

const WAIT: Duration = Duration::from_secs(2);
const SEED: u64 = 7;

fn fast_worker() -> SimulationWorker {
    SimulationWorker::spawn(WorkerOptions {
        tick_interval: Duration::from_millis(2),
        seed: Some(SEED),
    })
    .unwrap()
}

fn init(ids: &[&str]) -> Inbound {
    let nodes = ids
        .iter()
        .map(|id| NodeSpec {
            id: (*id).to_owned(),
            classification: Classification::Secondary,
        })
        .collect();
    let edges = ids
        .windows(2)
        .map(|pair| EdgeSpec {
            from: pair[0].to_owned(),
            to: pair[1].to_owned(),
        })
        .collect();
    Inbound::Init {
        nodes,
        edges,
        params: SimParams::default(),
    }
}

fn next_ids(worker: &SimulationWorker) -> Vec<String> {
    let Some(Outbound::Positions { positions }) = worker.recv_timeout(WAIT) else {
        panic!("expected a position update");
    };
    positions.into_iter().map(|position| position.id).collect()
}

fn drain(worker: &SimulationWorker) {
    while worker.try_recv().is_some() {}
}

/// Leaves the worker running unread long enough to queue a large backlog,
/// then stops it and waits for the last tick to land.
fn build_backlog(worker: &SimulationWorker, ids: &[&str]) {
    worker.post(init(ids));
    thread::sleep(Duration::from_millis(400));
    worker.post(Inbound::Stop);
    thread::sleep(Duration::from_millis(50));
}

/// The same layout computed on this thread, one entry per tick.
fn replay(ids: &[&str]) -> impl Iterator<Item = Vec<NodePosition>> {
    let Inbound::Init {
        nodes,
        edges,
        params,
    } = init(ids)
    else {
        unreachable!();
    };
    let mut simulation = Simulation::seeded(SEED);
    simulation.init(&nodes, &edges, params);
    std::iter::from_fn(move || {
        simulation.step();
        Some(simulation.positions())
    })
}

#[test]
fn test_init_streams_positions() {
    let worker = fast_worker();
    assert!(worker.post(init(&["a", "b", "c"])));

    for _ in 0..3 {
        assert_eq!(next_ids(&worker), vec!["a", "b", "c"]);
    }
}

#[test]
fn test_stop_halts_updates() {
    let worker = fast_worker();
    worker.post(init(&["a", "b"]));
    next_ids(&worker);

    worker.post(Inbound::Stop);
    thread::sleep(Duration::from_millis(50));
    drain(&worker);
    assert!(worker.recv_timeout(Duration::from_millis(100)).is_none());

    // Stopping twice is harmless and start resumes.
    worker.post(Inbound::Stop);
    worker.post(Inbound::Start);
    worker.post(Inbound::Start);
    assert_eq!(next_ids(&worker), vec!["a", "b"]);
}

#[test]
fn test_reinit_replaces_node_set() {
    let worker = fast_worker();
    worker.post(init(&["a", "b", "c"]));
    next_ids(&worker);

    worker.post(init(&["x", "y"]));
    let ids = (0..200)
        .map(|_| next_ids(&worker))
        .find(|ids| ids.first().is_some_and(|id| id == "x"))
        .expect("re-init never took effect");
    assert_eq!(ids, vec!["x", "y"]);
}

#[test]
fn test_empty_init_idles() {
    let worker = fast_worker();
    worker.post(init(&[]));
    assert!(worker.recv_timeout(Duration::from_millis(100)).is_none());
    assert!(worker.is_alive());
}

#[test]
fn test_bad_json_is_ignored() {
    let worker = fast_worker();
    assert!(!worker.post_json(r#"{"type":"explode"}"#));
    assert!(!worker.post_json("not json"));
    assert!(worker.post_json(r#"{"type":"init","nodes":[{"id":"n"}]}"#));

    assert_eq!(next_ids(&worker), vec!["n"]);
    assert!(worker.is_alive());
}

#[test]
fn test_update_params_keeps_layout_running() {
    let worker = fast_worker();
    worker.post(init(&["a", "b"]));
    next_ids(&worker);

    worker.post(Inbound::UpdateParams {
        params: SimParamsPatch {
            repulsion: Some(800.0),
            ..SimParamsPatch::default()
        },
    });
    worker.post(Inbound::UpdateNodes {
        nodes: vec![NodeSpec {
            id: "a".to_owned(),
            classification: Classification::Main,
        }],
    });
    assert_eq!(next_ids(&worker), vec!["a", "b"]);
}

#[test]
fn test_backlog_ends_at_final_state() {
    let ids = ["a", "b", "c"];
    let worker = fast_worker();
    build_backlog(&worker, &ids);

    let mut received = 0;
    let mut last = None;
    while let Some(Outbound::Positions { positions }) = worker.try_recv() {
        received += 1;
        last = Some(positions);
    }
    assert!(received > 64, "only {received} updates were queued");

    let expected = replay(&ids).nth(received - 1).unwrap();
    assert_eq!(last, Some(expected));
    assert!(worker.recv_timeout(Duration::from_millis(100)).is_none());
}

#[test]
fn test_latest_positions_returns_newest_tick() {
    let ids = ["a", "b"];
    let worker = fast_worker();
    build_backlog(&worker, &ids);

    let latest = worker.latest_positions().expect("updates should be queued");
    assert!(worker.try_recv().is_none());

    let tick = replay(&ids)
        .take(10_000)
        .position(|positions| positions == latest)
        .expect("latest update matches no tick of the layout");
    assert!(tick >= 64, "latest update was tick {tick}");
}

#[test]
fn test_graph_output_feeds_worker() {
    let notes = vec![
        Note::new("1", "Home", "See [[Work]]"),
        Note::new("2", "Work", "Back to [[Home]]"),
        Note::new("3", "Isolated", ""),
    ];
    let graph = index_graph(&notes);

    let worker = fast_worker();
    worker.post(Inbound::from_graph(&graph, SimParams::default()));
    assert_eq!(next_ids(&worker), vec!["1", "2", "3"]);

    worker.terminate();
}
