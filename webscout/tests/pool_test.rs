use anyhow::Result;
use crossbeam_channel::{unbounded, Receiver};
use std::io::{Cursor, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use webscout::{
    spawn_line_source, Body, PoolController, Report, ScoutConfig, ScoutError, ScoutResult,
};

#[derive(Default)]
struct Recorded {
    counts: Mutex<Vec<(String, u64)>>,
    failures: Mutex<Vec<String>>,
    totals: Mutex<Vec<u64>>,
}

#[derive(Clone, Default)]
struct Recorder(Arc<Recorded>);

impl Report for Recorder {
    fn task_counted(&self, url: &str, count: u64) {
        self.0.counts.lock().unwrap().push((url.to_string(), count));
    }
    fn task_failed(&self, url: &str, _error: &ScoutError) {
        self.0.failures.lock().unwrap().push(url.to_string());
    }
    fn total(&self, total: u64) {
        self.0.totals.lock().unwrap().push(total);
    }
}

/// Tracks how many fetches are running at once
#[derive(Default)]
struct Gauge {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

fn gauged_fetcher(
    gauge: Arc<Gauge>,
    delay: Duration,
) -> impl Fn(&str) -> ScoutResult<Body> + Send + Sync + 'static {
    move |url: &str| -> ScoutResult<Body> {
        let now = gauge.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        gauge.peak.fetch_max(now, Ordering::SeqCst);
        gauge.seen.lock().unwrap().push(url.to_string());
        thread::sleep(delay);
        gauge.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(Box::new(Cursor::new(b"go Go gopher".to_vec())))
    }
}

fn tasks(urls: &[String]) -> Receiver<String> {
    let (tx, rx) = unbounded();
    for url in urls {
        tx.send(url.clone()).unwrap();
    }
    rx
}

fn urls(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("http://host/{}", i)).collect()
}

fn config(max_workers: usize) -> ScoutConfig {
    ScoutConfig {
        max_workers,
        word: "go".to_string(),
        ..ScoutConfig::default()
    }
}

#[test]
fn test_each_task_processed_once() -> Result<()> {
    for max_workers in [1, 2, 3, 8] {
        let gauge = Arc::new(Gauge::default());
        let pool = PoolController::with_parts(
            &config(max_workers),
            gauged_fetcher(gauge.clone(), Duration::ZERO),
            Recorder::default(),
        )?;

        let expected = urls(200);
        let summary = pool.run(tasks(&expected))?;

        let mut seen = gauge.seen.lock().unwrap().clone();
        seen.sort();
        let mut sorted = expected.clone();
        sorted.sort();
        assert_eq!(seen, sorted, "max_workers {}", max_workers);
        assert_eq!(summary.tasks_counted, 200);
        // "go", "Go" and the "go" in "gopher"
        assert_eq!(summary.total, 600);
    }
    Ok(())
}

#[test]
fn test_parallelism_capped() -> Result<()> {
    let gauge = Arc::new(Gauge::default());
    let pool = PoolController::with_parts(
        &config(3),
        gauged_fetcher(gauge.clone(), Duration::from_millis(20)),
        Recorder::default(),
    )?;

    let summary = pool.run(tasks(&urls(30)))?;

    assert_eq!(gauge.peak.load(Ordering::SeqCst), 3);
    assert_eq!(summary.workers_spawned, 3);
    assert_eq!(summary.tasks_processed(), 30);
    Ok(())
}

#[test]
fn test_fewer_tasks_than_workers_all_run_at_once() -> Result<()> {
    let gauge = Arc::new(Gauge::default());
    let pool = PoolController::with_parts(
        &config(5),
        gauged_fetcher(gauge.clone(), Duration::from_millis(100)),
        Recorder::default(),
    )?;

    let summary = pool.run(tasks(&urls(2)))?;

    assert_eq!(gauge.peak.load(Ordering::SeqCst), 2);
    assert!(summary.workers_spawned <= 3);
    assert_eq!(summary.tasks_counted, 2);
    Ok(())
}

#[test]
fn test_lazy_hiring_keeps_one_spare() -> Result<()> {
    let gauge = Arc::new(Gauge::default());
    let pool = PoolController::with_parts(
        &config(5),
        gauged_fetcher(gauge.clone(), Duration::from_millis(5)),
        Recorder::default(),
    )?;

    let summary = pool.run(tasks(&urls(1)))?;

    assert!(summary.workers_spawned <= 2);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    Ok(())
}

#[test]
fn test_single_worker_pool() -> Result<()> {
    let gauge = Arc::new(Gauge::default());
    let pool = PoolController::with_parts(
        &config(1),
        gauged_fetcher(gauge.clone(), Duration::from_millis(1)),
        Recorder::default(),
    )?;

    let summary = pool.run(tasks(&urls(10)))?;

    assert_eq!(summary.workers_spawned, 1);
    assert_eq!(gauge.peak.load(Ordering::SeqCst), 1);
    assert_eq!(summary.tasks_counted, 10);
    Ok(())
}

#[test]
fn test_total_excludes_failures() -> Result<()> {
    let recorder = Recorder::default();
    let fetcher = |url: &str| -> ScoutResult<Body> {
        if url.ends_with("/down") {
            return Err(ScoutError::fetch_failure(url, "connection refused"));
        }
        if url.ends_with("/reset") {
            return Ok(Box::new(ResetAfter(Cursor::new(b"go go go".to_vec()))));
        }
        Ok(Box::new(Cursor::new(format!("go {}", url).into_bytes())))
    };
    let pool = PoolController::with_parts(&config(4), fetcher, recorder.clone())?;

    let input = vec![
        "http://a/go".to_string(),
        "http://b/down".to_string(),
        "http://c/reset".to_string(),
        "http://d/plain".to_string(),
    ];
    let summary = pool.run(tasks(&input))?;

    // a: "go" + "/go"; d: "go"
    assert_eq!(summary.total, 3);
    assert_eq!(summary.tasks_counted, 2);
    assert_eq!(summary.tasks_failed, 2);

    let per_task: u64 = recorder.0.counts.lock().unwrap().iter().map(|(_, c)| c).sum();
    assert_eq!(per_task, summary.total);
    assert_eq!(*recorder.0.totals.lock().unwrap(), vec![3]);

    let mut failures = recorder.0.failures.lock().unwrap().clone();
    failures.sort();
    assert_eq!(failures, vec!["http://b/down", "http://c/reset"]);
    Ok(())
}

#[test]
fn test_from_line_source() -> Result<()> {
    let recorder = Recorder::default();
    let fetcher = |url: &str| -> ScoutResult<Body> {
        Ok(Box::new(Cursor::new(url.as_bytes().to_vec())))
    };
    let pool = PoolController::with_parts(&config(2), fetcher, recorder.clone())?;

    let input = "http://go.dev/\n\nhttp://example.com/Go/go\nhttp://example.com/\n";
    let summary = pool.run(spawn_line_source(Cursor::new(input))?)?;

    assert_eq!(summary.tasks_counted, 3);
    assert_eq!(summary.total, 3);
    Ok(())
}

#[test]
fn test_tasks_arriving_slowly() -> Result<()> {
    let gauge = Arc::new(Gauge::default());
    let pool = PoolController::with_parts(
        &config(4),
        gauged_fetcher(gauge.clone(), Duration::ZERO),
        Recorder::default(),
    )?;

    let (tx, rx) = unbounded();
    let producer = thread::spawn(move || {
        for url in urls(20) {
            tx.send(url).unwrap();
            thread::sleep(Duration::from_millis(2));
        }
    });

    let summary = pool.run(rx)?;
    producer.join().unwrap();

    assert_eq!(summary.tasks_counted, 20);
    assert!(summary.workers_spawned <= 4);
    Ok(())
}

/// Yields its data, then reports a reset connection
struct ResetAfter(Cursor<Vec<u8>>);

impl Read for ResetAfter {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        match self.0.read(buf)? {
            0 => Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset",
            )),
            n => Ok(n),
        }
    }
}
