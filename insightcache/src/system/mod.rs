// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! System metrics providers
//!
//! The optimization engine reads host memory pressure and process footprint
//! through [`SystemMetricsProvider`]. [`SysinfoMetrics`] queries the operating
//! system; [`StaticMetrics`] reports values set by the host.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use sysinfo::{CpuExt, Pid, ProcessExt, System, SystemExt};

use crate::error::{CacheError, CacheResult};

/// Point-in-time host and process resource usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemSnapshot {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    /// Resident memory of the current process
    pub process_memory_bytes: u64,
}

pub trait SystemMetricsProvider: Send + Sync {
    fn snapshot(&self) -> CacheResult<SystemSnapshot>;
}

/// Provider backed by the `sysinfo` crate
pub struct SysinfoMetrics {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl SysinfoMetrics {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                log::warn!("Process memory tracking unavailable: {}", e);
                None
            }
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
        }
    }
}

impl Default for SysinfoMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMetricsProvider for SysinfoMetrics {
    fn snapshot(&self) -> CacheResult<SystemSnapshot> {
        let mut system = self.system.lock();
        system.refresh_memory();
        system.refresh_cpu();

        let total_memory = system.total_memory();
        if total_memory == 0 {
            return Err(CacheError::SystemMetrics(
                "total memory reported as 0".to_string(),
            ));
        }

        let process_memory_bytes = match self.pid {
            Some(pid) if system.refresh_process(pid) => {
                system.process(pid).map(|p| p.memory()).unwrap_or(0)
            }
            _ => 0,
        };

        Ok(SystemSnapshot {
            cpu_percent: system.global_cpu_info().cpu_usage() as f64,
            memory_percent: system.used_memory() as f64 / total_memory as f64 * 100.0,
            process_memory_bytes,
        })
    }
}

/// Provider reporting host-supplied values; `None` reads as unavailable
#[derive(Debug, Default)]
pub struct StaticMetrics {
    snapshot: Mutex<Option<SystemSnapshot>>,
}

impl StaticMetrics {
    pub fn new(snapshot: SystemSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(Some(snapshot)),
        }
    }

    pub fn with_memory_percent(memory_percent: f64) -> Self {
        Self::new(SystemSnapshot {
            memory_percent,
            ..SystemSnapshot::default()
        })
    }

    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn set(&self, snapshot: SystemSnapshot) {
        *self.snapshot.lock() = Some(snapshot);
    }

    pub fn set_unavailable(&self) {
        *self.snapshot.lock() = None;
    }
}

impl SystemMetricsProvider for StaticMetrics {
    fn snapshot(&self) -> CacheResult<SystemSnapshot> {
        let snapshot = *self.snapshot.lock();
        snapshot.ok_or_else(|| CacheError::SystemMetrics("no snapshot configured".to_string()))
    }
}
