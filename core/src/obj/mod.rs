pub mod registry;


pub use registry::{
    FieldInit, OBJECT_ID_FIRST, ObjectEntry, ObjectId, ObjectRegistry, RECORD_ID_FIRST, is_record_id,
};
