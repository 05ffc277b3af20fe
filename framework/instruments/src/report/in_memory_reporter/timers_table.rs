use tabled::Tabled;

use crate::snapshot::TimerSnapshot;

#[derive(Tabled)]
pub struct TimerRow {
    pub request_id: String,
    pub timer: String,
    pub count: usize,
    #[tabled(display = "float2")]
    pub avg_time_ms: f64,
    #[tabled(display = "float2")]
    pub min_time_ms: f64,
    #[tabled(display = "float2")]
    pub max_time_ms: f64,
    #[tabled(display = "float2")]
    pub p99_time_ms: f64,
    #[tabled(display = "float2")]
    pub uptime_ms: f64,
}

impl TimerRow {
    pub fn new(request_id: String, timer: String, snapshot: &TimerSnapshot, uptime_ms: f64) -> Self {
        Self {
            request_id,
            timer,
            count: snapshot.count,
            avg_time_ms: snapshot.mean.as_secs_f64() * 1000.0,
            min_time_ms: snapshot.min.as_secs_f64() * 1000.0,
            max_time_ms: snapshot.max.as_secs_f64() * 1000.0,
            p99_time_ms: snapshot.p99.as_secs_f64() * 1000.0,
            uptime_ms,
        }
    }
}

fn float2(n: &f64) -> String {
    format!("{:.2}", n)
}
