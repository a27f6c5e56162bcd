// Desktop entry point. Wraps the web frontend and provides native capabilities.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

fn main() {
    media_batch_fetcher_lib::run();
}
