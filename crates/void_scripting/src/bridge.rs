//! Component access for script code by type tag
//!
//! Script classes ask for engine components by a string tag (for example
//! `"TransformComponent"`). The bridge maps each tag to three closures so
//! the scripting layer never needs the concrete component types.

use std::collections::HashMap;

use void_core::Uuid;

type HasFn<W> = Box<dyn Fn(&W, Uuid) -> bool + Send + Sync>;
type AddFn<W> = Box<dyn Fn(&mut W, Uuid) + Send + Sync>;
type GetFn<W> = Box<dyn Fn(&W, Uuid) -> Option<serde_json::Value> + Send + Sync>;

/// The has/add/get closures for one component type
pub struct ComponentFns<W> {
    pub has: HasFn<W>,
    pub add: AddFn<W>,
    pub get: GetFn<W>,
}

/// Type tag to component closures, over a world type `W`
pub struct ComponentBridge<W> {
    entries: HashMap<String, ComponentFns<W>>,
}

impl<W> Default for ComponentBridge<W> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<W> ComponentBridge<W> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tag, replacing any previous entry
    pub fn register<H, A, G>(&mut self, tag: impl Into<String>, has: H, add: A, get: G)
    where
        H: Fn(&W, Uuid) -> bool + Send + Sync + 'static,
        A: Fn(&mut W, Uuid) + Send + Sync + 'static,
        G: Fn(&W, Uuid) -> Option<serde_json::Value> + Send + Sync + 'static,
    {
        self.entries.insert(
            tag.into(),
            ComponentFns {
                has: Box::new(has),
                add: Box::new(add),
                get: Box::new(get),
            },
        );
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// `None` when the tag is unknown
    pub fn has(&self, world: &W, entity: Uuid, tag: &str) -> Option<bool> {
        self.entries.get(tag).map(|fns| (fns.has)(world, entity))
    }

    /// Returns false when the tag is unknown
    pub fn add(&self, world: &mut W, entity: Uuid, tag: &str) -> bool {
        match self.entries.get(tag) {
            Some(fns) => {
                (fns.add)(world, entity);
                true
            }
            None => {
                log::warn!("No component registered for tag {}", tag);
                false
            }
        }
    }

    pub fn get(&self, world: &W, entity: Uuid, tag: &str) -> Option<serde_json::Value> {
        self.entries
            .get(tag)
            .and_then(|fns| (fns.get)(world, entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[derive(Default)]
    struct World {
        health: HashMap<Uuid, i32>,
    }

    fn bridge() -> ComponentBridge<World> {
        let mut bridge = ComponentBridge::new();
        bridge.register(
            "Health",
            |w: &World, e| w.health.contains_key(&e),
            |w: &mut World, e| {
                w.health.insert(e, 100);
            },
            |w: &World, e| w.health.get(&e).map(|h| serde_json::json!({ "Value": h })),
        );
        bridge
    }

    #[test]
    fn test_has_add_get() {
        let bridge = bridge();
        let mut world = World::default();
        let e = Uuid::from_u64(9);

        assert_eq!(bridge.has(&world, e, "Health"), Some(false));
        assert!(bridge.add(&mut world, e, "Health"));
        assert_eq!(bridge.has(&world, e, "Health"), Some(true));
        assert_eq!(
            bridge.get(&world, e, "Health"),
            Some(serde_json::json!({ "Value": 100 }))
        );
    }

    #[test]
    fn test_unknown_tag() {
        let bridge = bridge();
        let mut world = World::default();
        let e = Uuid::from_u64(1);
        assert_eq!(bridge.has(&world, e, "Mana"), None);
        assert!(!bridge.add(&mut world, e, "Mana"));
        assert!(bridge.get(&world, e, "Mana").is_none());
        assert!(bridge.contains("Health"));
    }
}
