use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::library::Library;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) bind_addrs: Arc<Vec<SocketAddr>>,
    pub(crate) library_root: Arc<PathBuf>,
    pub(crate) library: Library,
}
