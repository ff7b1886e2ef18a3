use basic_mem::lang::Ident;
use basic_mem::mach::{Arrays, Memory};
use std::rc::Rc;

/// A session's variable memory: 16K ceiling, array records starting
/// at an address typical for an empty program.
pub fn session() -> (Rc<Memory>, Arrays) {
    let memory = Rc::new(Memory::new(0x4000, 0x0DA0));
    let arrays = Arrays::new(Rc::clone(&memory));
    (memory, arrays)
}

pub fn ident(name: &str) -> Ident {
    match Ident::new(name) {
        Ok(ident) => ident,
        Err(error) => panic!("{}", error),
    }
}
