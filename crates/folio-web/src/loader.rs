//! Model fetch and import.
//!
//! The document is fetched first; any external buffers it references are then
//! fetched relative to the model path before the scene is built.

use anyhow::{anyhow, bail};
use folio_core::gltf_import::{self, ExternalBuffers};
use folio_core::{Scene, ViewerEvent, ViewerSession};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys as web;

/// Load the model in the background and hand the outcome to the session.
pub fn spawn_scene_load(model_path: String, session: Rc<RefCell<ViewerSession>>) {
    spawn_local(async move {
        log::info!("[scene] loading {}", model_path);
        let event = match load_scene(&model_path).await {
            Ok(scene) => ViewerEvent::SceneLoaded(scene),
            Err(e) => ViewerEvent::SceneLoadFailed(format!("{}: {:#}", model_path, e)),
        };
        session.borrow_mut().handle(event);
    });
}

pub async fn load_scene(model_path: &str) -> anyhow::Result<Scene> {
    let bytes = fetch_bytes(model_path).await?;
    log::info!("[scene] fetched {} ({} bytes)", model_path, bytes.len());
    let gltf = gltf_import::parse(&bytes)?;
    let mut external = ExternalBuffers::default();
    for uri in gltf_import::external_buffer_uris(&gltf.document) {
        let url = gltf_import::resolve_relative(model_path, &uri);
        let data = fetch_bytes(&url).await?;
        log::info!("[scene] fetched {} ({} bytes)", url, data.len());
        external.insert(uri, data);
    }
    Ok(gltf_import::import_scene(gltf, &external)?)
}

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(|e| anyhow!(format!("fetch {} failed: {:?}", url, e)))?
        .dyn_into()
        .map_err(|e| anyhow!(format!("{:?}", e)))?;
    if !resp.ok() {
        bail!("fetch {} returned HTTP {}", url, resp.status());
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(|e| anyhow!(format!("{:?}", e)))?)
        .await
        .map_err(|e| anyhow!(format!("reading {} failed: {:?}", url, e)))?;
    Ok(js_sys::Uint8Array::new(&buf).to_vec())
}
