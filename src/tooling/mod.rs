use std::path::{Path, PathBuf};
use tauri::{AppHandle, Emitter};
use url::Url;

mod batch;
mod commands;
mod runtime;

use batch::*;
use runtime::*;

pub use commands::*;
