pub mod emit;
pub mod err;
pub mod lower;
pub mod module;
pub mod op;
pub mod value;
pub mod verify;

pub use self::emit::{Emitter, MemoryEmitter, TextEmitter, output_path};
pub use self::err::IrError;
pub use self::module::{Block, ClassLayout, Function, Global, IrModule};
pub use self::verify::verify_module;
