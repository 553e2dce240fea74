//! FFI bridge: the battle core behind a C ABI for non-Rust hosts.
//!
//! Simulations live in a process-wide registry and are addressed by an opaque
//! `u64` handle (0 is never issued). Structured data crosses the boundary as
//! JSON. Every `*mut c_char` returned here must be released with
//! [`free_string`]. Null or malformed input yields null / 0 / -1, never a panic.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock, PoisonError};

use crate::arena::{HostElement, Rect};
use crate::engine::{BattleConfig, Simulation};
use crate::error::BattleError;
use crate::fighter::Team;
use crate::logging;

// ========================
// Data transfer types
// ========================

/// Host layout pushed once per frame (page coordinates)
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutUpdate {
    pub container: Option<Rect>,
    pub elements: Vec<HostElement>,
}

// ========================
// Registry
// ========================

static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

fn registry() -> &'static Mutex<HashMap<u64, Simulation>> {
    static REGISTRY: OnceLock<Mutex<HashMap<u64, Simulation>>> = OnceLock::new();
    REGISTRY.get_or_init(|| Mutex::new(HashMap::new()))
}

fn with_sim<R>(handle: u64, f: impl FnOnce(&mut Simulation) -> R) -> Result<R, BattleError> {
    let mut sims = registry().lock().unwrap_or_else(PoisonError::into_inner);
    let sim = sims
        .get_mut(&handle)
        .ok_or(BattleError::InvalidHandle(handle))?;
    Ok(f(sim))
}

// ========================
// Helpers
// ========================

fn json_to_cstring<T: Serialize>(value: &T) -> *mut c_char {
    match serde_json::to_string(value) {
        Ok(json) => CString::new(json).unwrap_or_default().into_raw(),
        Err(_) => std::ptr::null_mut(),
    }
}

fn parse_cstr(ptr: *const c_char, what: &'static str) -> Result<String, BattleError> {
    if ptr.is_null() {
        return Err(BattleError::NullPointer(what));
    }
    unsafe { CStr::from_ptr(ptr) }
        .to_str()
        .map(str::to_owned)
        .map_err(|_| BattleError::InvalidUtf8(what))
}

fn create(config_json: *const c_char) -> Result<u64, BattleError> {
    let json = parse_cstr(config_json, "config_json")?;
    let config = BattleConfig::from_json(&json)?;
    let sim = Simulation::with_layout(config)?;
    let handle = NEXT_HANDLE.fetch_add(1, Ordering::Relaxed);
    registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(handle, sim);
    Ok(handle)
}

fn set_layout(handle: u64, layout_json: *const c_char) -> Result<(), BattleError> {
    let json = parse_cstr(layout_json, "layout_json")?;
    let layout: LayoutUpdate = serde_json::from_str(&json)?;
    with_sim(handle, |sim| sim.set_layout(layout.container, layout.elements))
}

fn status(result: Result<(), BattleError>) -> i32 {
    match result {
        Ok(()) => 1,
        Err(err) => {
            tracing::warn!(error = %err, "bridge call rejected");
            0
        }
    }
}

// ========================
// C-ABI: Core
// ========================

#[no_mangle]
pub extern "C" fn battle_version() -> *mut c_char {
    CString::new(env!("CARGO_PKG_VERSION"))
        .unwrap_or_default()
        .into_raw()
}

/// Free a string allocated by this library.
/// `ptr` must come from a prior call into this library, or be null.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        unsafe {
            drop(CString::from_raw(ptr));
        }
    }
}

/// Default battle configuration as JSON
#[no_mangle]
pub extern "C" fn battle_default_config() -> *mut c_char {
    json_to_cstring(&BattleConfig::default())
}

/// Initialize logging from a JSON `TracingConfig`; null uses the defaults
#[no_mangle]
pub extern "C" fn battle_logging_init(config_json: *const c_char) {
    let config = parse_cstr(config_json, "config_json")
        .ok()
        .and_then(|json| logging::TracingConfig::from_json(&json))
        .unwrap_or_default();
    logging::init_tracing(&config);
}

/// Initialize logging at a numeric level: 0 trace, 1 debug, 2 info, 3 warn,
/// 4 error
#[no_mangle]
pub extern "C" fn battle_logging_init_level(level: u32) {
    logging::init_tracing(&logging::TracingConfig::with_level(logging::LogLevel::from_id(level)));
}

// ========================
// C-ABI: Lifecycle
// ========================

/// Create a simulation from a JSON `BattleConfig`; returns 0 on failure
#[no_mangle]
pub extern "C" fn battle_create(config_json: *const c_char) -> u64 {
    match create(config_json) {
        Ok(handle) => handle,
        Err(err) => {
            tracing::warn!(error = %err, "battle_create failed");
            0
        }
    }
}

/// Dispose and forget a simulation; unknown handles are ignored
#[no_mangle]
pub extern "C" fn battle_destroy(handle: u64) {
    let removed = registry()
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(&handle);
    if let Some(mut sim) = removed {
        sim.dispose();
    }
}

/// Returns 1 on success, 0 for an unknown handle
#[no_mangle]
pub extern "C" fn battle_start(handle: u64) -> i32 {
    status(with_sim(handle, Simulation::start))
}

#[no_mangle]
pub extern "C" fn battle_stop(handle: u64) -> i32 {
    status(with_sim(handle, Simulation::stop))
}

// ========================
// C-ABI: Per frame
// ========================

/// Push the host layout (`LayoutUpdate` JSON); returns 1 on success
#[no_mangle]
pub extern "C" fn battle_set_layout(handle: u64, layout_json: *const c_char) -> i32 {
    status(set_layout(handle, layout_json))
}

/// Advance to host time `now_ms` and return the snapshot JSON, or null
#[no_mangle]
pub extern "C" fn battle_tick(handle: u64, now_ms: f64) -> *mut c_char {
    match with_sim(handle, |sim| sim.tick(now_ms)) {
        Ok(Some(snapshot)) => json_to_cstring(&snapshot),
        Ok(None) => std::ptr::null_mut(),
        Err(err) => {
            tracing::debug!(error = %err, "battle_tick ignored");
            std::ptr::null_mut()
        }
    }
}

/// -1 while undecided or for unknown handles, 0 left, 1 right
#[no_mangle]
pub extern "C" fn battle_winner(handle: u64) -> i32 {
    match with_sim(handle, |sim| sim.winner()) {
        Ok(Some(Team::Left)) => 0,
        Ok(Some(Team::Right)) => 1,
        _ => -1,
    }
}

/// 1 once the end-of-battle transition has fired, 0 otherwise
#[no_mangle]
pub extern "C" fn battle_is_finished(handle: u64) -> i32 {
    with_sim(handle, |sim| i32::from(sim.is_finished())).unwrap_or(0)
}

/// Running totals as JSON, or null for an unknown handle
#[no_mangle]
pub extern "C" fn battle_stats(handle: u64) -> *mut c_char {
    match with_sim(handle, |sim| sim.stats()) {
        Ok(stats) => json_to_cstring(&stats),
        Err(_) => std::ptr::null_mut(),
    }
}
