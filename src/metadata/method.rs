//! Method bodies: local variables and decoded CIL instructions.
//!
//! Instructions keep their operand in structured form. Operands that point at other
//! metadata are resolved into [`TypeReference`], [`FieldReference`] and
//! [`MethodReference`] handles, which is all a weaver needs to judge where a call or
//! field access leads.

use std::fmt;

use crate::metadata::references::{FieldReference, MethodReference, ReferenceKind, TypeReference};

/// The body of a method with IL code.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MethodBody {
    /// Maximum evaluation stack depth
    pub max_stack: u16,
    /// Whether locals are zero-initialized
    pub init_locals: bool,
    /// Local variable declarations, in slot order
    pub locals: Vec<LocalVariable>,
    /// Decoded instruction stream, in offset order
    pub instructions: Vec<Instruction>,
}

impl MethodBody {
    /// Creates an empty body.
    #[must_use]
    pub fn new() -> Self {
        MethodBody {
            max_stack: 8,
            init_locals: true,
            locals: Vec::new(),
            instructions: Vec::new(),
        }
    }

    /// Declares a new local variable in the next free slot.
    ///
    /// Slot indices are 16-bit, so a body holds at most 65535 distinct slots. Locals
    /// declared past that limit all get index `u16::MAX` instead of wrapping around.
    #[must_use]
    pub fn with_local(mut self, variable_type: TypeReference) -> Self {
        let index = u16::try_from(self.locals.len()).unwrap_or(u16::MAX);
        self.locals.push(LocalVariable {
            index,
            variable_type,
        });
        self
    }

    /// Appends an instruction, assigning it the next offset.
    ///
    /// Offsets are approximated as one byte per opcode plus the operand size, which is
    /// enough for stable diagnostics on synthetic bodies.
    #[must_use]
    pub fn with_instruction(mut self, mnemonic: &'static str, operand: Operand) -> Self {
        let offset = self
            .instructions
            .last()
            .map_or(0, |last| last.offset + 1 + last.operand.encoded_size());
        self.instructions.push(Instruction {
            offset,
            mnemonic,
            operand,
        });
        self
    }
}

/// A local variable slot.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalVariable {
    /// Slot index
    pub index: u16,
    /// Declared type
    pub variable_type: TypeReference,
}

/// A single decoded CIL instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    /// Offset of the instruction from the start of the method body
    pub offset: u32,
    /// Human-readable instruction mnemonic (e.g., "call", "ldsfld", "ret")
    pub mnemonic: &'static str,
    /// The operand data for this instruction
    pub operand: Operand,
}

/// Immediate operand values.
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Immediate {
    Int8(i8),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
}

/// The operand of an instruction.
///
/// Metadata operands are a closed set of three reference kinds. [`Operand::reference_kind`]
/// is the one place consumers learn which kind an operand carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand present
    None,
    /// Immediate value (constant embedded in instruction)
    Immediate(Immediate),
    /// Branch target offset
    Target(u32),
    /// Local variable index
    Local(u16),
    /// Method argument index
    Argument(u16),
    /// User string literal (`ldstr`)
    String(String),
    /// Switch table with multiple target offsets
    Switch(Vec<u32>),
    /// Type token (`box`, `newarr`, `castclass`, `ldtoken`, ...)
    Type(TypeReference),
    /// Field token (`ldfld`, `stsfld`, ...)
    Field(FieldReference),
    /// Method token (`call`, `callvirt`, `newobj`, `ldftn`, ...)
    Method(MethodReference),
}

impl Operand {
    /// Returns the kind of metadata this operand references, if any.
    #[must_use]
    pub fn reference_kind(&self) -> Option<ReferenceKind> {
        match self {
            Operand::Type(_) => Some(ReferenceKind::Type),
            Operand::Field(_) => Some(ReferenceKind::Field),
            Operand::Method(_) => Some(ReferenceKind::Method),
            _ => None,
        }
    }

    /// Returns true if the metadata this operand references originates from `library`.
    ///
    /// Field and method references are judged by their declaring type. Operands without a
    /// metadata reference are never foreign.
    #[must_use]
    pub fn is_from(&self, library: &str) -> bool {
        match self {
            Operand::Type(reference) => reference.is_from(library),
            Operand::Field(reference) => reference.is_from(library),
            Operand::Method(reference) => reference.is_from(library),
            _ => false,
        }
    }

    /// Calls `visitor` for every type reference this operand mentions.
    pub fn visit(&self, visitor: &mut dyn FnMut(&TypeReference)) {
        match self {
            Operand::Type(reference) => reference.visit(visitor),
            Operand::Field(reference) => reference.visit(visitor),
            Operand::Method(reference) => reference.visit(visitor),
            _ => {}
        }
    }

    fn encoded_size(&self) -> u32 {
        match self {
            Operand::None => 0,
            Operand::Immediate(Immediate::Int8(_)) => 1,
            Operand::Local(_) | Operand::Argument(_) => 2,
            Operand::Immediate(Immediate::Int64(_)) | Operand::Immediate(Immediate::Float64(_)) => 8,
            Operand::Switch(targets) => 4 + 4 * targets.len() as u32,
            _ => 4,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::None => Ok(()),
            Operand::Immediate(Immediate::Int8(value)) => write!(f, "{}", value),
            Operand::Immediate(Immediate::Int32(value)) => write!(f, "{}", value),
            Operand::Immediate(Immediate::Int64(value)) => write!(f, "{}", value),
            Operand::Immediate(Immediate::Float32(value)) => write!(f, "{}", value),
            Operand::Immediate(Immediate::Float64(value)) => write!(f, "{}", value),
            Operand::Target(target) => write!(f, "IL_{:04x}", target),
            Operand::Local(index) => write!(f, "V_{}", index),
            Operand::Argument(index) => write!(f, "A_{}", index),
            Operand::String(value) => write!(f, "{:?}", value),
            Operand::Switch(targets) => {
                write!(f, "(")?;
                for (index, target) in targets.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "IL_{:04x}", target)?;
                }
                write!(f, ")")
            }
            Operand::Type(reference) => write!(f, "{}", reference),
            Operand::Field(reference) => write!(f, "{}", reference),
            Operand::Method(reference) => write!(f, "{}", reference),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> TypeReference {
        TypeReference::external("FSharp.Core", "Microsoft.FSharp.Core", "Unit")
    }

    #[test]
    fn test_body_builder_offsets() {
        let body = MethodBody::new()
            .with_instruction("ldarg.0", Operand::None)
            .with_instruction("ldc.i4", Operand::Immediate(Immediate::Int32(42)))
            .with_instruction("stloc.s", Operand::Local(0))
            .with_instruction("ret", Operand::None);

        let offsets: Vec<u32> = body.instructions.iter().map(|i| i.offset).collect();
        assert_eq!(offsets, vec![0, 1, 6, 9]);
    }

    #[test]
    fn test_local_slots() {
        let body = MethodBody::new().with_local(unit()).with_local(unit());
        assert_eq!(body.locals[0].index, 0);
        assert_eq!(body.locals[1].index, 1);
    }

    #[test]
    fn test_local_slot_limit() {
        let mut body = MethodBody::new();
        body.locals = vec![
            LocalVariable {
                index: 0,
                variable_type: unit(),
            };
            usize::from(u16::MAX)
        ];

        let body = body.with_local(unit()).with_local(unit());
        let last: Vec<u16> = body.locals.iter().rev().take(2).map(|l| l.index).collect();
        assert_eq!(last, vec![u16::MAX, u16::MAX]);
    }

    #[test]
    fn test_reference_kind_dispatch() {
        let field = FieldReference::new(unit(), "value", unit());
        let method = MethodReference::new(unit(), "get_Default", unit());

        assert_eq!(Operand::Type(unit()).reference_kind(), Some(ReferenceKind::Type));
        assert_eq!(Operand::Field(field).reference_kind(), Some(ReferenceKind::Field));
        assert_eq!(Operand::Method(method).reference_kind(), Some(ReferenceKind::Method));
        assert_eq!(Operand::Target(12).reference_kind(), None);
        assert_eq!(Operand::String("x".into()).reference_kind(), None);
    }

    #[test]
    fn test_operand_origin_and_display() {
        let field = FieldReference::new(unit(), "value", unit());
        let console = TypeReference::external("System.Console", "System", "Console");
        let write_line = MethodReference::new(console, "WriteLine", unit());

        assert!(Operand::Field(field.clone()).is_from("FSharp.Core"));
        assert!(!Operand::Method(write_line.clone()).is_from("FSharp.Core"));
        assert!(Operand::Method(write_line).is_from("System.Console"));
        assert!(!Operand::String("FSharp.Core".into()).is_from("FSharp.Core"));

        assert_eq!(Operand::Field(field.clone()).to_string(), field.to_string());
        assert_eq!(Operand::Target(0x1a).to_string(), "IL_001a");
        assert_eq!(Operand::Switch(vec![2, 16]).to_string(), "(IL_0002, IL_0010)");
        assert_eq!(Operand::String("hi".into()).to_string(), "\"hi\"");
        assert_eq!(Operand::None.to_string(), "");
    }

    #[test]
    fn test_operand_visit() {
        let method = MethodReference::new(unit(), "get_Default", unit());
        let mut count = 0;
        Operand::Method(method).visit(&mut |_| count += 1);
        assert_eq!(count, 2);

        let mut none = 0;
        Operand::None.visit(&mut |_| none += 1);
        assert_eq!(none, 0);
    }
}
