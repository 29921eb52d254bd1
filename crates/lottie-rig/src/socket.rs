use crate::library::{Composition, CompositionId, CompositionLibrary, LayerSource};
use std::collections::HashSet;
use std::sync::{Mutex, OnceLock};

/// Address of a layer inside the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerRef {
    pub composition: CompositionId,
    pub layer: usize,
}

/// A socket layer together with the precomposition layers enclosing it,
/// outermost first. `containers` is empty for sockets in the root composition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSocket {
    pub socket: LayerRef,
    pub containers: Vec<LayerRef>,
}

impl ResolvedSocket {
    pub fn owning_composition(&self) -> &CompositionId {
        &self.socket.composition
    }
}

fn log_revisit_once(from: &CompositionId, to: &str) {
    static SEEN: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();
    let key = format!("{from}->{to}");
    let store = SEEN.get_or_init(|| Mutex::new(HashSet::new()));
    if let Ok(mut seen) = store.lock() {
        if seen.insert(key) {
            tracing::debug!(from = %from, to, "composition already searched, skipping");
        }
    }
}

/// Depth-first search for the first layer named `name`, starting at the root
/// composition.
///
/// Layers are visited in declaration order and a layer is matched before its
/// nested composition is entered. Each composition is searched at most once, so
/// reference cycles terminate and the result is deterministic.
pub fn resolve_socket(library: &CompositionLibrary, name: &str) -> Option<ResolvedSocket> {
    let mut visited = HashSet::new();
    visited.insert(CompositionId::Root);
    let mut path = Vec::new();
    search(library, library.root(), name, &mut visited, &mut path)
}

fn search(
    library: &CompositionLibrary,
    comp: &Composition,
    name: &str,
    visited: &mut HashSet<CompositionId>,
    path: &mut Vec<LayerRef>,
) -> Option<ResolvedSocket> {
    for (pos, layer) in comp.layers.iter().enumerate() {
        let here = LayerRef {
            composition: comp.id.clone(),
            layer: pos,
        };

        if layer.name() == name {
            return Some(ResolvedSocket {
                socket: here,
                containers: path.clone(),
            });
        }

        let LayerSource::Composition(nested_id) = comp.source(pos) else {
            continue;
        };
        let nested_key = CompositionId::Asset(nested_id.clone());
        if !visited.insert(nested_key) {
            log_revisit_once(&comp.id, nested_id);
            continue;
        }
        let Some(nested) = library.asset(nested_id) else {
            continue;
        };

        path.push(here);
        if let Some(found) = search(library, nested, name, visited, path) {
            return Some(found);
        }
        path.pop();
    }
    None
}
