//! Solver statistics tracking.

use std::time::Instant;

use log::info;

/// Get current process memory usage in bytes (RSS - Resident Set Size).
/// Returns None if unable to determine.
#[cfg(target_os = "macos")]
pub fn get_memory_usage() -> Option<u64> {
    use std::mem::MaybeUninit;

    extern "C" {
        fn mach_task_self() -> u32;
        fn task_info(
            target_task: u32,
            flavor: i32,
            task_info_out: *mut libc::c_void,
            task_info_out_cnt: *mut u32,
        ) -> i32;
    }

    #[repr(C)]
    struct TaskBasicInfo {
        suspend_count: i32,
        virtual_size: u64,
        resident_size: u64,
        user_time: (i32, i32),
        system_time: (i32, i32),
        policy: i32,
    }

    const TASK_BASIC_INFO_64: i32 = 5;
    const TASK_BASIC_INFO_64_COUNT: u32 = 10;

    // SAFETY: task_info fills `info` when it returns 0; we only read it then.
    unsafe {
        let mut info = MaybeUninit::<TaskBasicInfo>::uninit();
        let mut count = TASK_BASIC_INFO_64_COUNT;
        let result = task_info(
            mach_task_self(),
            TASK_BASIC_INFO_64,
            info.as_mut_ptr() as *mut libc::c_void,
            &mut count,
        );
        (result == 0).then(|| info.assume_init().resident_size)
    }
}

#[cfg(target_os = "linux")]
pub fn get_memory_usage() -> Option<u64> {
    let status = std::fs::read_to_string("/proc/self/status").ok()?;
    let line = status.lines().find(|l| l.starts_with("VmRSS:"))?;
    let kb: u64 = line.split_whitespace().nth(1)?.parse().ok()?;
    Some(kb * 1024)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub fn get_memory_usage() -> Option<u64> {
    None
}

/// Format bytes as human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Counters for the memoized solver.
#[derive(Debug, Default)]
pub struct SolverStats {
    /// Positions scored and stored in the table
    pub positions_evaluated: u64,

    /// Cache hits (position or a symmetric image already in the table)
    pub cache_hits: u64,

    /// Positions scored by the pass rule
    pub pass_terminals: u64,

    /// Deepest ply reached
    pub max_depth: u64,

    start_time: Option<Instant>,
    last_log_time: Option<Instant>,
    last_log_positions: u64,
}

impl SolverStats {
    pub fn new() -> Self {
        Self {
            start_time: Some(Instant::now()),
            last_log_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    /// Record a stored position at `ply`.
    pub fn record_position(&mut self, ply: u64) {
        self.positions_evaluated += 1;
        self.max_depth = self.max_depth.max(ply);
    }

    pub fn record_pass(&mut self) {
        self.pass_terminals += 1;
    }

    /// Get current positions per second
    pub fn positions_per_sec(&self) -> f64 {
        match self.start_time {
            Some(start) if start.elapsed().as_secs_f64() > 0.0 => {
                self.positions_evaluated as f64 / start.elapsed().as_secs_f64()
            }
            _ => 0.0,
        }
    }

    /// Check if we should log progress
    pub fn should_log(&self, interval_secs: u64) -> bool {
        self.last_log_time
            .map_or(true, |last| last.elapsed().as_secs() >= interval_secs)
    }

    /// Log progress and reset log timer
    pub fn log_progress(&mut self, table_size: usize) {
        let elapsed_total = self.start_time.map(|s| s.elapsed().as_secs()).unwrap_or(0);

        let rate = match self.last_log_time {
            Some(last) if last.elapsed().as_secs_f64() > 0.0 => {
                (self.positions_evaluated - self.last_log_positions) as f64
                    / last.elapsed().as_secs_f64()
            }
            Some(_) => 0.0,
            None => self.positions_per_sec(),
        };

        let mem_str = get_memory_usage()
            .map(|m| format!(" mem={}", format_bytes(m)))
            .unwrap_or_default();

        info!(
            "[{:02}:{:02}:{:02}] positions={} unique={} cache_hits={} passes={} rate={:.0}/s depth={}{}",
            elapsed_total / 3600,
            (elapsed_total % 3600) / 60,
            elapsed_total % 60,
            self.positions_evaluated,
            table_size,
            self.cache_hits,
            self.pass_terminals,
            rate,
            self.max_depth,
            mem_str,
        );

        self.last_log_time = Some(Instant::now());
        self.last_log_positions = self.positions_evaluated;
    }

    /// Print final summary
    pub fn print_summary(&self) {
        println!("Positions evaluated: {}", self.positions_evaluated);
        println!("Cache hits: {}", self.cache_hits);
        println!("Pass terminals: {}", self.pass_terminals);
        println!("Max depth: {}", self.max_depth);
        println!("Average rate: {:.0} positions/sec", self.positions_per_sec());
    }
}
