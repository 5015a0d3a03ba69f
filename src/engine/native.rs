//! Production engine backed by the native analysis library.
//!
//! The library is opened at runtime with `libloading` from the resource
//! directory and exposes a small C ABI:
//!
//! ```text
//! rhubarb_init(locate, ctx)                                   -> engine* (null on failure)
//! rhubarb_analyze(engine, samples, len, rate, dialog, out, n) -> status (0 ok, 1 invalid audio)
//! rhubarb_last_error(engine)                                  -> const char*
//! rhubarb_free_cues(cues, n)
//! ```
//!
//! `locate` is the host's path-resolution callback; the engine calls it
//! during `rhubarb_init` for every data file it needs.

use std::ffi::{c_char, c_void, CStr, CString};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use libloading::{Library, Symbol};

use crate::engine::analysis::{AnalysisEngine, EngineError, NativeCue};
use crate::engine::loader::EngineInitError;
use crate::engine::resources::ResourceLocator;

// ---------------------------------------------------------------------------
// ABI
// ---------------------------------------------------------------------------

const LABEL_LEN: usize = 8;

const STATUS_OK: i32 = 0;
const STATUS_INVALID_AUDIO: i32 = 1;

/// One cue as laid out by the library.  `label` is NUL-padded ASCII.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct RawCue {
    start: f64,
    end: f64,
    label: [u8; LABEL_LEN],
}

impl RawCue {
    fn to_native(self) -> NativeCue {
        let len = self
            .label
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(LABEL_LEN);
        NativeCue::new(
            self.start,
            self.end,
            String::from_utf8_lossy(&self.label[..len]).into_owned(),
        )
    }
}

type LocateFileFn = unsafe extern "C" fn(
    ctx: *mut c_void,
    name: *const c_char,
    out: *mut c_char,
    out_cap: usize,
) -> usize;

type InitFn = unsafe extern "C" fn(locate: LocateFileFn, ctx: *mut c_void) -> *mut c_void;

type AnalyzeFn = unsafe extern "C" fn(
    engine: *mut c_void,
    samples: *const i16,
    len: usize,
    sample_rate: u32,
    dialog: *const c_char,
    out_cues: *mut *mut RawCue,
    out_len: *mut usize,
) -> i32;

type LastErrorFn = unsafe extern "C" fn(engine: *mut c_void) -> *const c_char;

type FreeCuesFn = unsafe extern "C" fn(cues: *mut RawCue, len: usize);

/// Host side of `locate`: resolve `name` through the [`ResourceLocator`]
/// passed as `ctx`, write it NUL-terminated into `out` when it fits, and
/// return the length the path needs (without the NUL).
unsafe extern "C" fn locate_file(
    ctx: *mut c_void,
    name: *const c_char,
    out: *mut c_char,
    out_cap: usize,
) -> usize {
    if ctx.is_null() || name.is_null() {
        return 0;
    }
    // SAFETY: `ctx` is the `&ResourceLocator` handed to `rhubarb_init`, which
    // outlives the init call; `name` is a NUL-terminated string from the engine.
    let locator = unsafe { &*(ctx as *const ResourceLocator) };
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();

    let resolved = locator.locate(&name);
    let resolved = resolved.to_string_lossy();
    let bytes = resolved.as_bytes();

    if !out.is_null() && bytes.len() < out_cap {
        // SAFETY: `out` has room for `out_cap` bytes and `bytes.len() + 1 <= out_cap`.
        unsafe {
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), out as *mut u8, bytes.len());
            *out.add(bytes.len()) = 0;
        }
    }
    bytes.len()
}

// ---------------------------------------------------------------------------
// NativeEngine
// ---------------------------------------------------------------------------

struct EnginePtr(*mut c_void);

// SAFETY: the pointer is only dereferenced by the library, and every call
// that uses it goes through the `Mutex` in `NativeEngine`.
unsafe impl Send for EnginePtr {}

/// [`AnalysisEngine`] over the dynamically loaded native library.
///
/// Calls into the library are serialised; the engine instance is never
/// destroyed and lives as long as the process.
pub struct NativeEngine {
    analyze_fn: AnalyzeFn,
    last_error_fn: LastErrorFn,
    free_cues_fn: FreeCuesFn,
    engine: Mutex<EnginePtr>,
    library_path: PathBuf,
    // Function pointers above point into this library.
    _lib: Library,
}

impl std::fmt::Debug for NativeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeEngine")
            .field("library_path", &self.library_path)
            .finish_non_exhaustive()
    }
}

impl NativeEngine {
    /// Open the library for `library_name` under the locator's base dir and
    /// initialise one engine instance.
    ///
    /// # Errors
    ///
    /// - [`EngineInitError::ResourceMissing`]: the library file does not exist.
    /// - [`EngineInitError::Library`]: it could not be opened or lacks a symbol.
    /// - [`EngineInitError::Init`]: `rhubarb_init` returned null.
    pub fn load(locator: &ResourceLocator, library_name: &str) -> Result<Self, EngineInitError> {
        let library_path = locator.library_path(library_name);
        if !library_path.is_file() {
            return Err(EngineInitError::ResourceMissing(
                library_path.display().to_string(),
            ));
        }

        // SAFETY: opening the engine library runs its initialisers; the file
        // comes from the runtime's own resource directory.
        let lib = unsafe { Library::new(&library_path) }.map_err(|e| {
            EngineInitError::Library(format!("{}: {e}", library_path.display()))
        })?;

        let init_fn: InitFn = load_symbol(&lib, b"rhubarb_init\0")?;
        let analyze_fn: AnalyzeFn = load_symbol(&lib, b"rhubarb_analyze\0")?;
        let last_error_fn: LastErrorFn = load_symbol(&lib, b"rhubarb_last_error\0")?;
        let free_cues_fn: FreeCuesFn = load_symbol(&lib, b"rhubarb_free_cues\0")?;

        // SAFETY: `locate_file` matches `LocateFileFn`; `locator` stays borrowed
        // for the duration of the call, which is the only time the library may
        // invoke the callback.
        let raw = unsafe {
            init_fn(
                locate_file,
                locator as *const ResourceLocator as *mut c_void,
            )
        };
        if raw.is_null() {
            return Err(EngineInitError::Init(format!(
                "rhubarb_init returned null ({})",
                library_path.display()
            )));
        }

        Ok(Self {
            analyze_fn,
            last_error_fn,
            free_cues_fn,
            engine: Mutex::new(EnginePtr(raw)),
            library_path,
            _lib: lib,
        })
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    fn last_error(&self, engine: *mut c_void) -> String {
        // SAFETY: `engine` is the live instance from `rhubarb_init`; the
        // returned string is owned by the library and copied immediately.
        let msg = unsafe { (self.last_error_fn)(engine) };
        if msg.is_null() {
            return "unknown engine error".into();
        }
        unsafe { CStr::from_ptr(msg) }.to_string_lossy().into_owned()
    }
}

fn load_symbol<T: Copy>(lib: &Library, name: &[u8]) -> Result<T, EngineInitError> {
    // SAFETY: `T` is the fn-pointer type the library ABI declares for `name`.
    let symbol: Symbol<T> = unsafe { lib.get(name) }.map_err(|e| {
        let printable = name.strip_suffix(b"\0").unwrap_or(name);
        EngineInitError::Library(format!(
            "missing symbol `{}`: {e}",
            String::from_utf8_lossy(printable)
        ))
    })?;
    Ok(*symbol)
}

impl AnalysisEngine for NativeEngine {
    fn analyze(
        &self,
        samples: &[i16],
        sample_rate: u32,
        dialog_text: &str,
    ) -> Result<Vec<NativeCue>, EngineError> {
        let dialog = CString::new(dialog_text)
            .map_err(|_| EngineError::Analysis("dialog text contains a NUL byte".into()))?;

        let engine = self.engine.lock().unwrap_or_else(PoisonError::into_inner);

        let mut cues_ptr: *mut RawCue = std::ptr::null_mut();
        let mut cues_len: usize = 0;

        // SAFETY: `samples` and `dialog` outlive the call; out-pointers are
        // valid locals; access to `engine.0` is serialised by the mutex guard.
        let status = unsafe {
            (self.analyze_fn)(
                engine.0,
                samples.as_ptr(),
                samples.len(),
                sample_rate,
                dialog.as_ptr(),
                &mut cues_ptr,
                &mut cues_len,
            )
        };

        if status != STATUS_OK {
            let message = self.last_error(engine.0);
            return Err(if status == STATUS_INVALID_AUDIO {
                EngineError::InvalidAudio(message)
            } else {
                EngineError::Analysis(format!("status {status}: {message}"))
            });
        }

        // SAFETY: on success the library hands over `cues_len` initialised
        // cues at `cues_ptr`, owned by us until `rhubarb_free_cues`.
        unsafe { take_cues(cues_ptr, cues_len, self.free_cues_fn) }
    }
}

/// Copy the cue array returned by `rhubarb_analyze` and release it.
///
/// A non-null array is always released, even when empty.  A null array with
/// a non-zero length is a broken result and is reported as an error.
///
/// # Safety
///
/// When `ptr` is non-null it must point to `len` initialised cues that
/// `free` accepts exactly once.
unsafe fn take_cues(
    ptr: *mut RawCue,
    len: usize,
    free: FreeCuesFn,
) -> Result<Vec<NativeCue>, EngineError> {
    if ptr.is_null() {
        return if len == 0 {
            Ok(Vec::new())
        } else {
            Err(EngineError::Analysis(format!(
                "engine reported {len} cues but returned no cue array"
            )))
        };
    }

    let cues = if len == 0 {
        Vec::new()
    } else {
        unsafe { std::slice::from_raw_parts(ptr, len) }
            .iter()
            .copied()
            .map(RawCue::to_native)
            .collect()
    };
    unsafe { free(ptr, len) };

    Ok(cues)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
