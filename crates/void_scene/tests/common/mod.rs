//! Shared fixtures for void_scene integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use void_core::Uuid;
use void_scene::SharedScriptEngine;
use void_scripting::{
    FieldBuffer, FieldValue, MethodHandle, ObjectHandle, Result, ScriptArg, ScriptClass,
    ScriptEngine, ScriptError, ScriptField, ScriptHost,
};

pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Script host double that records every call as a line of text
pub struct TestHost {
    classes: Vec<ScriptClass>,
    methods: Vec<(String, String, usize)>,
    objects: HashMap<u64, (Uuid, FieldBuffer)>,
    next_object: u64,
    log: CallLog,
}

impl TestHost {
    pub fn new(log: CallLog) -> Self {
        let player = ScriptClass::new("Game.Player")
            .with_field(ScriptField::new("Speed", FieldValue::Float(5.0)))
            .with_field(ScriptField::new("Secret", FieldValue::Int(7)).non_serialized());
        let enemy =
            ScriptClass::new("Game.Enemy").with_field(ScriptField::new("Health", FieldValue::Int(10)));

        let method = |class: &str, name: &str, params: usize| {
            (class.to_string(), name.to_string(), params)
        };
        let methods = vec![
            method("Game.Player", "OnCreate", 0),
            method("Game.Player", "OnUpdate", 1),
            method("Game.Player", "OnDestroy", 0),
            method("Game.Player", "OnCollisionEnter2D", 1),
            method("Game.Player", "OnCollisionExit2D", 1),
            method("Game.Enemy", "OnUpdate", 1),
        ];

        Self {
            classes: vec![player, enemy],
            methods,
            objects: HashMap::new(),
            next_object: 1,
            log,
        }
    }

    fn record(&self, line: String) {
        self.log.lock().push(line);
    }
}

impl ScriptHost for TestHost {
    fn load_assembly(&mut self, path: &Path) -> Result<()> {
        self.record(format!("load {}", path.display()));
        Ok(())
    }

    fn unload_assemblies(&mut self) {
        self.record("unload".into());
    }

    fn classes(&self) -> Vec<ScriptClass> {
        self.classes.clone()
    }

    fn instantiate(&mut self, class: &str, entity: Uuid) -> Result<ObjectHandle> {
        let declared = self
            .classes
            .iter()
            .find(|c| c.name == class)
            .ok_or_else(|| ScriptError::ClassNotFound(class.to_string()))?;
        let fields = declared
            .fields
            .values()
            .map(|f| (f.name.clone(), f.default.clone()))
            .collect();

        let id = self.next_object;
        self.next_object += 1;
        self.objects.insert(id, (entity, fields));
        Ok(ObjectHandle(id))
    }

    fn release(&mut self, object: ObjectHandle) {
        if let Some((entity, _)) = self.objects.remove(&object.0) {
            self.record(format!("release {}", entity));
        }
    }

    fn find_method(&self, class: &str, name: &str, param_count: usize) -> Option<MethodHandle> {
        self.methods
            .iter()
            .position(|(c, n, p)| c == class && n == name && *p == param_count)
            .map(|index| MethodHandle(index as u64))
    }

    fn invoke(&mut self, object: ObjectHandle, method: MethodHandle, args: &[ScriptArg]) -> Result<()> {
        let entity = self.objects[&object.0].0;
        let name = &self.methods[method.0 as usize].1;
        let line = match args.first() {
            Some(ScriptArg::Float(_)) => format!("{} {}", name, entity),
            Some(ScriptArg::Collision2D(data)) => format!("{} {} {}", name, entity, data.entity_id),
            None => format!("{} {}", name, entity),
        };
        self.record(line);
        Ok(())
    }

    fn get_field(&self, object: ObjectHandle, field: &str) -> Option<FieldValue> {
        self.objects.get(&object.0)?.1.get(field).cloned()
    }

    fn set_field(&mut self, object: ObjectHandle, field: &str, value: &FieldValue) -> Result<()> {
        if let Some((_, fields)) = self.objects.get_mut(&object.0) {
            fields.insert(field.to_string(), value.clone());
        }
        self.record(format!("set {}", field));
        Ok(())
    }

    fn get_field_string(&self, object: ObjectHandle, field: &str) -> Option<String> {
        self.get_field(object, field).map(|v| v.to_field_string())
    }

    fn set_field_string(&mut self, object: ObjectHandle, field: &str, value: &str) -> Result<()> {
        let current = self
            .get_field(object, field)
            .ok_or_else(|| ScriptError::CallError(format!("no field {}", field)))?;
        let parsed = FieldValue::parse(current.field_type(), value)
            .ok_or_else(|| ScriptError::CallError(format!("bad value {}", value)))?;
        self.set_field(object, field, &parsed)
    }
}

/// An engine with the test assembly loaded, plus its call log
pub fn script_engine() -> (SharedScriptEngine, CallLog) {
    let log = CallLog::default();
    let mut engine = ScriptEngine::new(Box::new(TestHost::new(log.clone())));
    engine
        .load_assembly("Game.dll")
        .expect("test assembly loads");
    log.lock().clear();
    (Arc::new(Mutex::new(engine)), log)
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
