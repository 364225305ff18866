use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Instant;
use uuid::Uuid;

/// Each event is a set of key-value pairs describing one admission decision.
/// The variants are the columns of the output file, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatParameter {
    /// Id of the scheduling run the event belongs to.
    RunId,

    /// Milliseconds since the collector was started.
    Time,

    /// Why the entry was written.
    LogDescription,

    /// "TT" or "AVB".
    TrafficClass,
    FlowId,
    Source,
    Destination,

    /// Final admission state of the flow.
    FlowState,

    /// TT period or AVB bandwidth, depending on the class.
    Demand,
    Deadline,
    HopCount,
    PropagationDelay,

    /// Transmission offset of a TT flow.
    Offset,
    UnplacedHops,

    /// AVB cycle length in ms at the time of the decision.
    CycleLength,
}

impl StatParameter {
    pub const ALL: [StatParameter; 15] = [
        StatParameter::RunId,
        StatParameter::Time,
        StatParameter::LogDescription,
        StatParameter::TrafficClass,
        StatParameter::FlowId,
        StatParameter::Source,
        StatParameter::Destination,
        StatParameter::FlowState,
        StatParameter::Demand,
        StatParameter::Deadline,
        StatParameter::HopCount,
        StatParameter::PropagationDelay,
        StatParameter::Offset,
        StatParameter::UnplacedHops,
        StatParameter::CycleLength,
    ];

    pub fn header(&self) -> &'static str {
        match self {
            StatParameter::RunId => "RunId",
            StatParameter::Time => "Time",
            StatParameter::LogDescription => "LogDescription",
            StatParameter::TrafficClass => "TrafficClass",
            StatParameter::FlowId => "FlowId",
            StatParameter::Source => "Source",
            StatParameter::Destination => "Destination",
            StatParameter::FlowState => "FlowState",
            StatParameter::Demand => "Demand",
            StatParameter::Deadline => "Deadline",
            StatParameter::HopCount => "HopCount",
            StatParameter::PropagationDelay => "PropagationDelay",
            StatParameter::Offset => "Offset",
            StatParameter::UnplacedHops => "UnplacedHops",
            StatParameter::CycleLength => "CycleLength",
        }
    }

    pub fn headers() -> Vec<&'static str> {
        StatParameter::ALL.iter().map(StatParameter::header).collect()
    }
}

/// Values are stored in their native format and only formatted when written.
#[derive(Debug, Clone, PartialEq)]
pub enum StatValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<u64> for StatValue {
    fn from(v: u64) -> Self {
        StatValue::Integer(v as i64)
    }
}

impl From<usize> for StatValue {
    fn from(v: usize) -> Self {
        StatValue::Integer(v as i64)
    }
}

impl From<f64> for StatValue {
    fn from(v: f64) -> Self {
        StatValue::Float(v)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

impl From<bool> for StatValue {
    fn from(v: bool) -> Self {
        StatValue::Bool(v)
    }
}

impl StatValue {
    fn to_field(&self) -> String {
        match self {
            StatValue::Integer(i) => i.to_string(),
            StatValue::Float(f) => f.to_string(),
            StatValue::Text(t) => t.clone(),
            StatValue::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    pub fn get(&self, param: StatParameter) -> Option<&StatValue> {
        self.data.get(&param)
    }

    /// The event as one CSV row in column order. Missing values are written as `NA`.
    pub fn to_row(&self) -> Vec<String> {
        StatParameter::ALL.iter().map(|param| self.data.get(param).map(StatValue::to_field).unwrap_or_else(|| "NA".to_string())).collect()
    }
}

/// Messages sent from the schedulers to the writer thread.
enum StatsMessage {
    Log(StatisticEvent),
    Flush,
    Shutdown,
}

/// Handle for recording statistic events of one scheduling run.
///
/// Rows are written by a background thread as `;`-separated CSV, to a file or to
/// stdout. Recording never blocks the caller; dropping the collector flushes the
/// file and joins the writer.
pub struct StatsCollector {
    sender: mpsc::Sender<StatsMessage>,
    writer: Option<JoinHandle<()>>,
    run_id: Uuid,
    start_time: Instant,
}

impl StatsCollector {
    /// Spawns the writer thread. The output file is created before this returns.
    pub fn init(filename: Option<&Path>, run_id: Uuid) -> io::Result<Self> {
        let output: Box<dyn Write + Send> = match filename {
            Some(path) => Box::new(File::create(path)?),
            None => Box::new(io::stdout()),
        };

        let (tx, rx) = mpsc::channel();
        let writer = thread::Builder::new().name("stats-writer".to_string()).spawn(move || Self::worker_loop(rx, output))?;

        Ok(StatsCollector { sender: tx, writer: Some(writer), run_id, start_time: Instant::now() })
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    fn worker_loop(rx: mpsc::Receiver<StatsMessage>, output: Box<dyn Write + Send>) {
        let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(output);

        if let Err(e) = csv_wtr.write_record(StatParameter::headers()) {
            log::error!("StatsWriteFailed: Failed to write headers: {}", e);
        }

        for msg in rx {
            match msg {
                StatsMessage::Log(event) => {
                    if let Err(e) = csv_wtr.write_record(event.to_row()) {
                        log::error!("StatsWriteFailed: Failed to write record: {}", e);
                    }
                }
                StatsMessage::Flush => {
                    if let Err(e) = csv_wtr.flush() {
                        log::error!("StatsWriteFailed: Failed to flush statistics: {}", e);
                    }
                }
                StatsMessage::Shutdown => break,
            }
        }

        if let Err(e) = csv_wtr.flush() {
            log::error!("StatsWriteFailed: Failed to flush statistics: {}", e);
        }
    }

    /// Queues an event for writing. Run id and time are filled in if absent.
    pub fn add_event(&self, mut event: StatisticEvent) {
        if event.get(StatParameter::RunId).is_none() {
            event.set(StatParameter::RunId, self.run_id.to_string());
        }

        if event.get(StatParameter::Time).is_none() {
            event.set(StatParameter::Time, self.start_time.elapsed().as_millis() as u64);
        }

        // A dead writer thread must not stop the scheduler.
        let _ = self.sender.send(StatsMessage::Log(event));
    }

    pub fn flush(&self) {
        let _ = self.sender.send(StatsMessage::Flush);
    }

    /// Writes all pending events and stops the writer thread.
    pub fn shutdown(mut self) {
        self.stop_writer();
    }

    fn stop_writer(&mut self) {
        let Some(writer) = self.writer.take() else {
            return;
        };

        let _ = self.sender.send(StatsMessage::Shutdown);
        if writer.join().is_err() {
            log::error!("StatsWriterPanicked: The statistics writer thread terminated abnormally.");
        }
    }
}

impl Drop for StatsCollector {
    fn drop(&mut self) {
        self.stop_writer();
    }
}

impl std::fmt::Debug for StatsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsCollector").field("run_id", &self.run_id).finish()
    }
}
