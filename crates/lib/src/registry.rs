//! # Scene Registry
//!
//! An explicit table of prompt adapters keyed by scene, owned by the application. A
//! scene has at most one default adapter; replacing it must go through
//! `override_default`, so an accidental second registration is an error.

use crate::{errors::RegistryError, scene::PromptAdapter};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct SceneRegistry {
    defaults: HashMap<String, Arc<PromptAdapter>>,
    alternates: HashMap<String, Vec<Arc<PromptAdapter>>>,
}

impl SceneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its scene. A non-default adapter is kept as an
    /// alternate; a default fails if the scene already has one.
    pub fn register(
        &mut self,
        adapter: PromptAdapter,
        is_default: bool,
    ) -> Result<Arc<PromptAdapter>, RegistryError> {
        let scene = adapter.scene.clone();
        let adapter = Arc::new(adapter);
        if is_default {
            if self.defaults.contains_key(&scene) {
                return Err(RegistryError::DefaultAlreadyRegistered(scene));
            }
            info!(
                scene = %scene,
                locale = %adapter.composer.locale(),
                "Registered default prompt adapter"
            );
            self.defaults.insert(scene, adapter.clone());
        } else {
            info!(
                scene = %scene,
                locale = %adapter.composer.locale(),
                "Registered alternate prompt adapter"
            );
            self.alternates
                .entry(scene)
                .or_default()
                .push(adapter.clone());
        }
        Ok(adapter)
    }

    /// Replaces the default adapter of a scene and returns the previous one.
    pub fn override_default(&mut self, adapter: PromptAdapter) -> Option<Arc<PromptAdapter>> {
        let scene = adapter.scene.clone();
        let previous = self.defaults.insert(scene.clone(), Arc::new(adapter));
        if previous.is_some() {
            warn!(scene = %scene, "Overriding the default prompt adapter");
        }
        previous
    }

    pub fn get_default(&self, scene: &str) -> Option<Arc<PromptAdapter>> {
        self.defaults.get(scene).cloned()
    }

    pub fn alternates(&self, scene: &str) -> &[Arc<PromptAdapter>] {
        self.alternates.get(scene).map(Vec::as_slice).unwrap_or_default()
    }

    /// The scenes that have a default adapter, sorted.
    pub fn scenes(&self) -> Vec<&str> {
        let mut scenes: Vec<&str> = self.defaults.keys().map(String::as_str).collect();
        scenes.sort_unstable();
        scenes
    }
}
