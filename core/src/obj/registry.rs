//! Identity-keyed registry of live script objects and data records.
//!
//! Objects carry a display name and can be addressed by it
//! (case-insensitively); records are addressed by identity only. Identities
//! come from two independent monotonic counters whose ranges do not overlap,
//! so "is this a record" is range membership alone. Field storage is sparse:
//! the first access to a field materializes a default cell.

use crate::util::fast_map::{FastHashMap, fast_hash_map_new};
use crate::util::key;
use crate::val::{IdentityLookup, ValueCell};

pub type ObjectId = i64;

/// Records count up from here.
pub const RECORD_ID_FIRST: ObjectId = 1;
/// Objects count up from here; everything below is reserved for records.
pub const OBJECT_ID_FIRST: ObjectId = 2000;

/// One field assignment applied at creation time, after any prototype copy.
#[derive(Debug, Clone)]
pub enum FieldInit {
    Plain { key: String, value: ValueCell },
    Array { key: String, indices: Vec<String>, value: ValueCell },
}

/// Array fields key on the field name plus the full tuple of index values,
/// all case-folded.
type ArrayKey = (String, Vec<String>);

#[derive(Debug, Clone)]
pub struct ObjectEntry {
    id: ObjectId,
    class_name: String,
    name: Option<String>,
    fields: FastHashMap<String, ValueCell>,
    array_fields: FastHashMap<ArrayKey, ValueCell>,
    children: Vec<ObjectId>,
}

impl ObjectEntry {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Display name; records have none.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn is_record(&self) -> bool {
        is_record_id(self.id)
    }

    pub fn field(&self, field_key: &str) -> Option<&ValueCell> {
        self.fields.get(&key::fold(field_key))
    }

    /// Field cell for writing; materializes a default cell on first access.
    pub fn field_mut(&mut self, field_key: &str) -> &mut ValueCell {
        self.fields.entry(key::fold(field_key)).or_default()
    }

    pub fn array_field(&self, field_key: &str, indices: &[&str]) -> Option<&ValueCell> {
        self.array_fields.get(&array_key(field_key, indices))
    }

    pub fn array_field_mut(&mut self, field_key: &str, indices: &[&str]) -> &mut ValueCell {
        self.array_fields.entry(array_key(field_key, indices)).or_default()
    }

    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    fn apply(&mut self, init: FieldInit) {
        match init {
            FieldInit::Plain { key: k, value } => {
                self.fields.insert(key::fold(&k), value);
            }
            FieldInit::Array { key: k, indices, value } => {
                let indices: Vec<&str> = indices.iter().map(String::as_str).collect();
                self.array_fields.insert(array_key(&k, &indices), value);
            }
        }
    }

    /// Enumerated copy of another entry's field set, cell by cell. Plain and
    /// array fields are copied separately; no cell is ever shared between
    /// the prototype and the copy.
    fn copy_fields_from(&mut self, proto: &ObjectEntry) {
        for (k, cell) in &proto.fields {
            self.fields.insert(k.clone(), cell.clone());
        }
        for (k, cell) in &proto.array_fields {
            self.array_fields.insert(k.clone(), cell.clone());
        }
    }
}

fn array_key(field_key: &str, indices: &[&str]) -> ArrayKey {
    (key::fold(field_key), indices.iter().map(|ix| key::fold(ix)).collect())
}

pub fn is_record_id(id: ObjectId) -> bool {
    id < OBJECT_ID_FIRST
}

#[derive(Debug)]
pub struct ObjectRegistry {
    entries: FastHashMap<ObjectId, ObjectEntry>,
    /// Folded display name -> id. First registrant under a name wins.
    names: FastHashMap<String, ObjectId>,
    next_object_id: ObjectId,
    next_record_id: ObjectId,
}

impl Default for ObjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            entries: fast_hash_map_new(),
            names: fast_hash_map_new(),
            next_object_id: OBJECT_ID_FIRST,
            next_record_id: RECORD_ID_FIRST,
        }
    }

    /// Create a named object. An unresolvable prototype name means
    /// "no prototype"; the entry's own fields land on top of any copy.
    pub fn create_object(
        &mut self,
        class_name: &str,
        name: &str,
        prototype: Option<&str>,
        fields: Vec<FieldInit>,
    ) -> ObjectId {
        let id = self.next_object_id;
        self.next_object_id += 1;
        let entry = self.build_entry(id, class_name, Some(name), prototype, fields);
        self.entries.insert(id, entry);
        self.names.entry(key::fold(name)).or_insert(id);
        id
    }

    /// Create an anonymous data record, addressable by identity only.
    pub fn create_record(
        &mut self,
        class_name: &str,
        prototype: Option<&str>,
        fields: Vec<FieldInit>,
    ) -> ObjectId {
        let id = self.next_record_id;
        self.next_record_id += 1;
        let entry = self.build_entry(id, class_name, None, prototype, fields);
        self.entries.insert(id, entry);
        id
    }

    fn build_entry(
        &self,
        id: ObjectId,
        class_name: &str,
        name: Option<&str>,
        prototype: Option<&str>,
        fields: Vec<FieldInit>,
    ) -> ObjectEntry {
        let mut entry = ObjectEntry {
            id,
            class_name: class_name.to_string(),
            name: name.map(str::to_string),
            fields: fast_hash_map_new(),
            array_fields: fast_hash_map_new(),
            children: Vec::new(),
        };
        if let Some(proto) = prototype.and_then(|p| self.find_by_name(p)).and_then(|pid| self.entry(pid)) {
            entry.copy_fields_from(proto);
        }
        for init in fields {
            entry.apply(init);
        }
        entry
    }

    pub fn find_by_name(&self, name: &str) -> Option<ObjectId> {
        self.names.get(&key::fold(name)).copied()
    }

    pub fn entry(&self, id: ObjectId) -> Option<&ObjectEntry> {
        self.entries.get(&id)
    }

    pub fn entry_mut(&mut self, id: ObjectId) -> Option<&mut ObjectEntry> {
        self.entries.get_mut(&id)
    }

    /// Receiver resolution: display name first, then a stringified identity
    /// checked against live entries.
    pub fn resolve_ident(&self, text: &str) -> Option<ObjectId> {
        if let Some(id) = self.find_by_name(text) {
            return Some(id);
        }
        let id = text.trim().parse::<ObjectId>().ok()?;
        self.entries.contains_key(&id).then_some(id)
    }

    pub fn field(&self, id: ObjectId, field_key: &str) -> Option<&ValueCell> {
        self.entry(id)?.field(field_key)
    }

    /// Writable field cell; `None` only when the identity is unknown.
    pub fn field_mut(&mut self, id: ObjectId, field_key: &str) -> Option<&mut ValueCell> {
        Some(self.entry_mut(id)?.field_mut(field_key))
    }

    pub fn set_field(&mut self, id: ObjectId, field_key: &str, value: ValueCell) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                *entry.field_mut(field_key) = value;
                true
            }
            None => false,
        }
    }

    pub fn array_field(&self, id: ObjectId, field_key: &str, indices: &[&str]) -> Option<&ValueCell> {
        self.entry(id)?.array_field(field_key, indices)
    }

    pub fn array_field_mut(
        &mut self,
        id: ObjectId,
        field_key: &str,
        indices: &[&str],
    ) -> Option<&mut ValueCell> {
        Some(self.entry_mut(id)?.array_field_mut(field_key, indices))
    }

    pub fn set_array_field(
        &mut self,
        id: ObjectId,
        field_key: &str,
        indices: &[&str],
        value: ValueCell,
    ) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                *entry.array_field_mut(field_key, indices) = value;
                true
            }
            None => false,
        }
    }

    /// Append a child to a group-like object. Ordering is insertion order.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) -> bool {
        if !self.entries.contains_key(&child) {
            return false;
        }
        match self.entry_mut(parent) {
            Some(entry) => {
                entry.children.push(child);
                true
            }
            None => false,
        }
    }

    pub fn child_count(&self, id: ObjectId) -> usize {
        self.entry(id).map_or(0, |entry| entry.children.len())
    }

    pub fn child_at(&self, id: ObjectId, index: usize) -> Option<ObjectId> {
        self.entry(id)?.children.get(index).copied()
    }
}

impl IdentityLookup for ObjectRegistry {
    /// Only named objects participate in identifier coercion; records never
    /// resolve by name.
    fn identity_of(&self, name: &str) -> Option<i64> {
        self.find_by_name(name)
    }
}
