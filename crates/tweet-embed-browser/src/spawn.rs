use futures_util::future::LocalFutureObj;
use futures_util::task::{LocalSpawn, SpawnError};

/// Runs embed tasks on the browser's microtask queue.
#[derive(Debug, Clone, Copy, Default)]
pub struct WasmSpawner;

impl LocalSpawn for WasmSpawner {
    fn spawn_local_obj(&self, future: LocalFutureObj<'static, ()>) -> Result<(), SpawnError> {
        wasm_bindgen_futures::spawn_local(future);
        Ok(())
    }
}
