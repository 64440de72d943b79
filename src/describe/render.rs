//! Second pass: write the description.

use std::fmt::Write;

use hashbrown::HashSet;

use super::format::*;
use super::scan::{Identity, ReferenceTable};
use crate::exposure::Exposure;
use crate::hooks::{self, HookRegistry};
use crate::model::{
    ComplexWidth, FloatWidth, Kind, MetaTarget, MetaValue, Signature, Type, UintWidth, Value,
};
use crate::Result;

/// Where in the graph a node was reached from.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Cursor {
    /// Inside an array or slice of unsigned integers.
    pub hex: bool,
    pub addressable: bool,
    /// Below a private field.
    pub sealed: bool,
}

impl Cursor {
    fn child(self) -> Self {
        Cursor { hex: false, ..self }
    }
}

pub(crate) struct Renderer<'a> {
    out: String,
    layout: Layout,
    table: &'a ReferenceTable,
    seen: HashSet<Identity>,
    hooks: &'a HookRegistry,
    /// `None` when sealed handles may not be opened at all.
    exposure: Option<&'a dyn Exposure>,
}

impl<'a> Renderer<'a> {
    pub fn new(
        table: &'a ReferenceTable,
        hooks: &'a HookRegistry,
        exposure: Option<&'a dyn Exposure>,
        indent_step: usize,
    ) -> Self {
        Self {
            out: String::new(),
            layout: Layout::new(indent_step),
            table,
            seen: HashSet::new(),
            hooks,
            exposure,
        }
    }

    pub fn finish(self) -> String {
        self.out
    }

    pub fn render(&mut self, value: &Value, cursor: Cursor) -> Result<()> {
        if value.is_nil() {
            return match value {
                Value::Func(f) => self.signature(NIL_FUNC, &f.signature),
                _ => {
                    self.out.push_str(NIL);
                    Ok(())
                }
            };
        }

        if let Value::Meta(meta) = value {
            return self.meta(meta, cursor);
        }

        if let Some(id) = Identity::of(value, cursor.addressable) {
            if let Some(label) = self.table.label(&id) {
                if !self.seen.insert(id) {
                    tracing::trace!(label, "back-reference");
                    write!(self.out, "{REFERENCE_PREFIX}{label}")?;
                    return Ok(());
                }
                write!(self.out, "{label}{REFERENCE_SEPARATOR}")?;
            }
        }

        if value.is_valid() && self.hook(value)? {
            return Ok(());
        }

        match value {
            Value::Invalid => self.out.push_str(INVALID),
            Value::Bool(b) => write!(self.out, "{b}")?,
            Value::Int { value, .. } => write!(self.out, "{value}")?,
            Value::Uint { value, width } => self.uint(*value, *width, cursor.hex)?,
            Value::Float { value, width: FloatWidth::F32 } => {
                write!(self.out, "{}", *value as f32)?
            }
            Value::Float { value, width: FloatWidth::F64 } => write!(self.out, "{value}")?,
            Value::Complex { re, im, width: ComplexWidth::C64 } => {
                write!(self.out, "({}{:+}i)", *re as f32, *im as f32)?
            }
            Value::Complex { re, im, width: ComplexWidth::C128 } => {
                write!(self.out, "({re}{im:+}i)")?
            }
            Value::String(s) => {
                self.out.push_str(OPEN_STRING);
                self.out.push_str(s);
                self.out.push_str(CLOSE_STRING);
            }
            Value::Pointer(p) => {
                self.out.push_str(POINTER_PREFIX);
                match p.target.as_ref().and_then(|slot| slot.read()) {
                    Some(target) => {
                        self.render(&target, Cursor { hex: false, addressable: true, ..cursor })?
                    }
                    None => self.locked(&p.elem)?,
                }
            }
            Value::Interface(i) => {
                self.out.push_str(INTERFACE_PREFIX);
                if let Some(held) = &i.held {
                    self.render(held, Cursor { hex: false, addressable: false, ..cursor })?;
                }
            }
            Value::Slice(s) => {
                write!(self.out, "{}", s.elem)?;
                match s.items.as_ref().and_then(|items| items.read()) {
                    Some(items) => {
                        let child = Cursor {
                            hex: s.elem.kind() == Kind::Uint,
                            addressable: true,
                            ..cursor
                        };
                        self.list(items.iter(), child)?;
                    }
                    None => self.locked(&value.type_of())?,
                }
            }
            Value::Array(a) => {
                write!(self.out, "{}", a.elem)?;
                let child = Cursor { hex: a.elem.kind() == Kind::Uint, ..cursor };
                self.list(a.items.iter(), child)?;
            }
            Value::Map(m) => {
                write!(self.out, "{}{MAP_TYPE_SEPARATOR}{}", m.key, m.value)?;
                match m.entries.as_ref().and_then(|entries| entries.read()) {
                    Some(entries) => {
                        let child = Cursor { hex: false, addressable: false, ..cursor };
                        self.layout.open(&mut self.out, OPEN_MAP);
                        for (i, (key, val)) in entries.iter().enumerate() {
                            self.layout.before_item(&mut self.out, i == 0)?;
                            self.render(key, child)?;
                            self.out.push_str(self.layout.key_value_separator());
                            self.render(val, child)?;
                        }
                        self.layout.close(&mut self.out, CLOSE_MAP, !entries.is_empty())?;
                    }
                    None => self.locked(&value.type_of())?,
                }
            }
            Value::Struct(s) => {
                self.out.push_str(&s.name);
                self.layout.open(&mut self.out, OPEN_STRUCT);
                for (i, field) in s.fields.iter().enumerate() {
                    self.layout.before_item(&mut self.out, i == 0)?;
                    self.out.push_str(&field.name);
                    self.out.push_str(self.layout.key_value_separator());
                    let child = Cursor {
                        sealed: cursor.sealed || field.is_private(),
                        ..cursor.child()
                    };
                    self.render(&field.value, child)?;
                }
                self.layout.close(&mut self.out, CLOSE_STRUCT, !s.fields.is_empty())?;
            }
            Value::Func(f) => self.signature(FUNC, &f.signature)?,
            Value::Chan(_) => write!(self.out, "{}", value.type_of())?,
            Value::RawPointer(Some(addr)) => write!(
                self.out,
                "{POINTER_PREFIX}0x{addr:0width$x}",
                width = UintWidth::Usize.hex_digits()
            )?,
            Value::Opaque(name) => write!(self.out, "<unhandled kind: {name}>")?,
            // Nil raw pointers and meta handles were dispatched above.
            Value::RawPointer(None) | Value::Meta(_) => {
                write!(self.out, "<unhandled kind: {}>", value.kind())?
            }
        }
        Ok(())
    }

    fn list<'v>(&mut self, items: impl Iterator<Item = &'v Value>, cursor: Cursor) -> Result<()> {
        self.layout.open(&mut self.out, OPEN_ARRAY);
        let mut any = false;
        for item in items {
            self.layout.before_item(&mut self.out, !any)?;
            any = true;
            self.render(item, cursor)?;
        }
        self.layout.close(&mut self.out, CLOSE_ARRAY, any)
    }

    fn uint(&mut self, value: u64, width: UintWidth, hex: bool) -> Result<()> {
        if hex {
            write!(self.out, "0x{value:0digits$x}", digits = width.hex_digits())?;
        } else {
            write!(self.out, "{value}")?;
        }
        Ok(())
    }

    fn signature(&mut self, prefix: &str, signature: &Signature) -> Result<()> {
        write!(self.out, "{prefix}{signature}")?;
        Ok(())
    }

    /// Storage that cannot be read right now (a writer holds it).
    fn locked(&mut self, ty: &Type) -> Result<()> {
        write!(self.out, "<locked: {ty}>")?;
        Ok(())
    }

    /// Returns true when a hook produced the rendering.
    fn hook(&mut self, value: &Value) -> Result<bool> {
        if self.hooks.is_empty() {
            return Ok(false);
        }
        let ty = value.type_of();
        let Some(hook) = self.hooks.get(&ty) else {
            return Ok(false);
        };
        match hooks::invoke(&hook, value) {
            Ok(text) => self.out.push_str(&text),
            Err(e) => {
                tracing::warn!(ty = %ty, error = %e, "custom hook failed");
                write!(self.out, "<hook failed: {e}>")?;
            }
        }
        Ok(true)
    }

    fn meta(&mut self, meta: &MetaValue, cursor: Cursor) -> Result<()> {
        let target = if !cursor.sealed {
            Some(meta.target())
        } else if let Some(exposure) = self.exposure {
            match exposure.expose(meta) {
                Ok(target) => Some(target),
                Err(e) => {
                    tracing::warn!(error = %e, "could not open sealed meta handle");
                    None
                }
            }
        } else {
            None
        };

        let Some(target) = target else {
            write!(self.out, "{meta}")?;
            return Ok(());
        };

        self.out.push_str(meta.kind().marker());
        self.out.push_str(OPEN_META);
        match target {
            MetaTarget::Value(inner) => {
                self.render(inner, Cursor { hex: cursor.hex, addressable: false, sealed: false })?
            }
            MetaTarget::Type(ty) => write!(self.out, "{ty}")?,
        }
        self.out.push_str(CLOSE_META);
        Ok(())
    }
}
