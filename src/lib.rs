pub mod address;
pub mod config;
pub mod error;
pub mod lru;
pub mod simulation;
pub mod simulation_result;
pub mod trace;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
use wasm_bindgen::prelude::*;

#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
#[wasm_bindgen]
pub fn run_simulation(trace: &str, set_bits: u32, lines_per_set: usize, block_bits: u32) -> String {
    use config::CacheConfig;
    use lru::LruCache;
    use simulation::Simulation;
    use trace::TraceFile;

    let config = match CacheConfig::new(set_bits, lines_per_set, block_bits) {
        Ok(config) => config,
        Err(e) => return e.to_string(),
    };
    let mut lru_cache = LruCache::new(config);

    Simulation::report(&mut lru_cache, &TraceFile::parse(trace))
}
