use crate::lang::Ident;
use crate::mach::{Arrays, Memory};
use std::rc::Rc;


fn ident(name: &str) -> Ident {
    match Ident::new(name) {
        Ok(ident) => ident,
        Err(error) => panic!("{}", error),
    }
}

fn session() -> Arrays {
    Arrays::new(Rc::new(Memory::new(0x8000, 0)))
}
