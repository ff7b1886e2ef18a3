use super::val::{self, Val};
use super::{Address, Memory};
use crate::error;
use crate::lang::{Error, Ident};
use indexmap::IndexMap;
use std::any::Any;
use std::rc::Rc;

type Result<T> = std::result::Result<T, Error>;

/// ## Array variable memory
///
/// Arrays live in one growing byte area, each as a header record
/// followed by packed element data. Addresses handed out by `varptr`
/// are real offsets into that area, so `PEEK` and pointer-based tricks
/// from era programs keep working: `erase` shifts every record
/// allocated after the erased one, and `peek` can reproduce any header
/// byte on demand.

pub struct Arrays {
    memory: Rc<Memory>,
    entries: IndexMap<Ident, Entry>,
    base: Option<i16>,
    current: usize,
}

struct Entry {
    dims: Vec<i16>,
    name_ptr: Address,
    array_ptr: Address,
    buffer: Vec<u8>,
    cache: Option<Rc<dyn Any>>,
}

/// Flat element offset for an index under the given base. The first
/// axis varies fastest; the accumulation order is part of the memory
/// layout and must not be reordered.
pub(super) fn flat_offset(index: &[i16], dims: &[i16], base: i16) -> usize {
    let mut offset = 0;
    let mut stride = 1;
    for (&sub, &dim) in index.iter().zip(dims.iter()) {
        offset += stride * (i32::from(sub) - i32::from(base)) as usize;
        stride *= (i32::from(dim) + 1 - i32::from(base)) as usize;
    }
    offset
}

/// Total element count for the dimensioned size, or None when the
/// product cannot be addressed.
pub(super) fn flat_len(dims: &[i16], base: i16) -> Option<usize> {
    let mut len = 1usize;
    for &dim in dims {
        len = len.checked_mul((i32::from(dim) + 1 - i32::from(base)) as usize)?;
    }
    Some(len)
}

/// Header record size: name field, packed size word, dimension count,
/// and one 16-bit extent per dimension.
fn record_len(ident: &Ident, dims: usize) -> usize {
    1 + ident.len().max(3) + 3 + 2 * dims
}

fn check_index(base: i16, dims: &[i16], index: &[i16]) -> Result<()> {
    if index.len() != dims.len() {
        return Err(error!(SubscriptOutOfRange));
    }
    for (&sub, &dim) in index.iter().zip(dims.iter()) {
        if sub < 0 {
            return Err(error!(IllegalFunctionCall));
        }
        if sub < base || sub > dim {
            return Err(error!(SubscriptOutOfRange));
        }
    }
    Ok(())
}

impl Default for Arrays {
    fn default() -> Arrays {
        Arrays::new(Rc::new(Memory::default()))
    }
}

impl Arrays {
    pub fn new(memory: Rc<Memory>) -> Arrays {
        Arrays {
            memory,
            entries: IndexMap::new(),
            base: None,
            current: 0,
        }
    }

    /// Drop every array, zero the area, and unset OPTION BASE. Done as
    /// one step so a program reset can never observe a half-cleared
    /// table.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.base = None;
        self.current = 0;
    }

    /// OPTION BASE. Once resolved, the base can only be repeated.
    pub fn set_base(&mut self, base: i16) -> Result<()> {
        if base != 0 && base != 1 {
            return Err(error!(SyntaxError));
        }
        match self.base {
            Some(current) if current != base => Err(error!(DuplicateDefinition)),
            _ => {
                self.base = Some(base);
                Ok(())
            }
        }
    }

    pub fn clear_base(&mut self) {
        self.base = None;
    }

    fn resolve_base(&mut self) -> i16 {
        *self.base.get_or_insert(0)
    }

    /// DIM. Allocates header and element space at the end of the area.
    pub fn dimension(&mut self, ident: &Ident, dims: &[i16]) -> Result<()> {
        let base = self.resolve_base();
        if self.entries.contains_key(ident) {
            return Err(error!(DuplicateDefinition));
        }
        for &dim in dims {
            if dim < 0 {
                return Err(error!(IllegalFunctionCall));
            }
            if dim < base {
                return Err(error!(SubscriptOutOfRange));
            }
        }
        let record_len = record_len(ident, dims.len());
        let array_bytes = match flat_len(dims, base) {
            Some(len) => match len.checked_mul(val::size_bytes(ident)) {
                Some(bytes) => bytes,
                None => return Err(error!(OutOfMemory)),
            },
            None => return Err(error!(OutOfMemory)),
        };
        self.memory.check_free(self.current, record_len + array_bytes)?;
        let name_ptr = self.current;
        let array_ptr = name_ptr + record_len;
        self.current += record_len + array_bytes;
        self.entries.insert(
            ident.clone(),
            Entry {
                dims: dims.to_vec(),
                name_ptr,
                array_ptr,
                buffer: vec![0; array_bytes],
                cache: None,
            },
        );
        Ok(())
    }

    /// ERASE. Frees the record and compacts the area: every record
    /// allocated after the erased one moves down by the freed size.
    pub fn erase(&mut self, ident: &Ident) -> Result<()> {
        let erased = match self.entries.shift_remove(ident) {
            Some(entry) => entry,
            None => return Err(error!(IllegalFunctionCall)),
        };
        let freed = (erased.array_ptr - erased.name_ptr) + erased.buffer.len();
        for entry in self.entries.values_mut() {
            if entry.name_ptr > erased.name_ptr {
                entry.name_ptr -= freed;
                entry.array_ptr -= freed;
            }
        }
        self.current -= freed;
        Ok(())
    }

    pub fn is_dimensioned(&self, ident: &Ident) -> bool {
        self.entries.contains_key(ident)
    }

    pub fn names(&self) -> impl Iterator<Item = &Ident> {
        self.entries.keys()
    }

    pub fn dimensions(&self, ident: &Ident) -> Option<&[i16]> {
        match self.entries.get(ident) {
            Some(entry) => Some(&entry.dims),
            None => None,
        }
    }

    /// Element data size of an array, or 0 if it does not exist.
    pub fn size_bytes(&self, ident: &Ident) -> usize {
        match self.entries.get(ident) {
            Some(entry) => entry.buffer.len(),
            None => 0,
        }
    }

    /// Bytes of the area in use, headers included.
    pub fn bytes_used(&self) -> usize {
        self.current
    }

    /// Ensure the array exists and the index is legal. An undimensioned
    /// name is auto-dimensioned to 10 per axis first; that sticks even
    /// when the index then turns out to be out of range.
    fn check_dim(&mut self, ident: &Ident, index: &[i16]) -> Result<()> {
        if !self.entries.contains_key(ident) {
            self.dimension(ident, &vec![10; index.len()])?;
        }
        let base = self.resolve_base();
        match self.entries.get(ident) {
            Some(entry) => check_index(base, &entry.dims, index),
            None => Err(error!(InternalError; "LOST ARRAY")),
        }
    }

    /// Writable window over one element's packed bytes. Never a copy;
    /// string pointers stored here must stay visible to the string
    /// space garbage collector.
    pub fn view(&mut self, ident: &Ident, index: &[i16]) -> Result<&mut [u8]> {
        self.check_dim(ident, index)?;
        let base = self.resolve_base();
        let size = val::size_bytes(ident);
        match self.entries.get_mut(ident) {
            Some(entry) => {
                let offset = flat_offset(index, &entry.dims, base) * size;
                Ok(&mut entry.buffer[offset..offset + size])
            }
            None => Err(error!(InternalError; "LOST ARRAY")),
        }
    }

    /// Writable window over an array's entire element data.
    pub fn view_full(&mut self, ident: &Ident) -> Option<&mut [u8]> {
        match self.entries.get_mut(ident) {
            Some(entry) => Some(&mut entry.buffer),
            None => None,
        }
    }

    pub fn fetch(&mut self, ident: &Ident, index: &[i16]) -> Result<Val> {
        let view = self.view(ident, index)?;
        Ok(Val::from_bytes(ident, view))
    }

    pub fn store(&mut self, ident: &Ident, index: &[i16], value: Val) -> Result<()> {
        let bytes = value.to_type(ident)?.to_bytes();
        let view = self.view(ident, index)?;
        view.copy_from_slice(&bytes);
        // drop cache
        if let Some(entry) = self.entries.get_mut(ident) {
            entry.cache = None;
        }
        Ok(())
    }

    /// VARPTR. Absolute address of one element's packed bytes.
    pub fn varptr(&self, ident: &Ident, index: &[i16]) -> Result<Address> {
        let entry = match self.entries.get(ident) {
            Some(entry) => entry,
            None => return Err(error!(IllegalFunctionCall)),
        };
        let base = match self.base {
            Some(base) => base,
            None => 0,
        };
        check_index(base, &entry.dims, index)?;
        let offset = flat_offset(index, &entry.dims, base) * val::size_bytes(ident);
        Ok(self.memory.array_start() + entry.array_ptr + offset)
    }

    /// Value at an absolute element data address, decoded at the width
    /// of the owning array. None when no array data owns the address.
    pub fn dereference(&self, address: Address) -> Option<Val> {
        let start = self.memory.array_start();
        let mut found: Option<(&Ident, &Entry)> = None;
        for (ident, entry) in &self.entries {
            if start + entry.array_ptr <= address {
                match found {
                    Some((_, nearest)) if nearest.array_ptr >= entry.array_ptr => {}
                    _ => found = Some((ident, entry)),
                }
            }
        }
        let (ident, entry) = found?;
        let offset = address - start - entry.array_ptr;
        let bytes = entry.buffer.get(offset..offset + val::size_bytes(ident))?;
        Some(Val::from_bytes(ident, bytes))
    }

    /// PEEK. Raw byte at an absolute address anywhere in the array
    /// area. Header bytes are rebuilt on every call so they always
    /// reflect the current base and dimensions. None past the end of
    /// the occupied area.
    pub fn peek(&self, address: Address) -> Option<u8> {
        let start = self.memory.array_start();
        let mut found: Option<(&Ident, &Entry)> = None;
        for (ident, entry) in &self.entries {
            if start + entry.name_ptr <= address {
                match found {
                    Some((_, nearest)) if nearest.name_ptr >= entry.name_ptr => {}
                    _ => found = Some((ident, entry)),
                }
            }
        }
        let (ident, entry) = found?;
        if address >= start + entry.array_ptr {
            let offset = address - start - entry.array_ptr;
            entry.buffer.get(offset).copied()
        } else {
            let offset = address - start - entry.name_ptr;
            let name_len = ident.len().max(3) + 1;
            if offset < name_len {
                Some(val::name_in_memory(ident, offset))
            } else {
                let base = match self.base {
                    Some(base) => base,
                    None => 0,
                };
                let mut record = Vec::with_capacity(3 + 2 * entry.dims.len());
                let size = (entry.buffer.len() + 1 + 2 * entry.dims.len()) as u16;
                record.extend_from_slice(&size.to_le_bytes());
                record.push(entry.dims.len() as u8);
                for &dim in &entry.dims {
                    let extent = (i32::from(dim) + 1 - i32::from(base)) as u16;
                    record.extend_from_slice(&extent.to_le_bytes());
                }
                record.get(offset - name_len).copied()
            }
        }
    }

    /// Every string pointer slot across all string arrays, for the
    /// string space garbage collector. Slot width comes from the value
    /// encoding, not from this table.
    pub fn string_views(&mut self) -> Vec<&mut [u8]> {
        let mut views: Vec<&mut [u8]> = Vec::new();
        for (ident, entry) in self.entries.iter_mut() {
            if let Ident::String(_) = ident {
                views.extend(entry.buffer.chunks_exact_mut(val::size_bytes(ident)));
            }
        }
        views
    }

    /// Renderer cache attached to an array, dropped on any element
    /// write.
    pub fn get_cache(&self, ident: &Ident) -> Option<Rc<dyn Any>> {
        match self.entries.get(ident) {
            Some(entry) => entry.cache.clone(),
            None => None,
        }
    }

    pub fn set_cache(&mut self, ident: &Ident, item: Rc<dyn Any>) {
        if let Some(entry) = self.entries.get_mut(ident) {
            entry.cache = Some(item);
        }
    }
}

impl std::fmt::Debug for Arrays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (ident, entry) in &self.entries {
            write!(f, "{}{:?}:", ident, entry.dims)?;
            for byte in &entry.buffer {
                write!(f, " {:02x}", byte)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
