/*! The operation catalog.
 *
 * Every JVM instruction code is listed once, with its mnemonic and semantic category. The lookup
 * tables are built lazily on first use and never mutated afterwards, so concurrent analyses can
 * share them freely.
 */

use crate::values::InitialValue;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Local,
    Stack,
    Constant,
    Arithmetic,
    Cast,
    Object,
    Field,
    Method,
    Array,
    Branch,
    Return,
    Nop,
}

macro_rules! opcodes {
    ($($name:ident = $code:literal, $mnemonic:literal, $category:ident;)*) => {
        #[allow(non_camel_case_types, clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        #[repr(u8)]
        pub enum Opcode {
            $($name = $code,)*
        }

        impl Opcode {
            pub const ALL: &'static [Opcode] = &[$(Opcode::$name,)*];

            pub fn mnemonic(self) -> &'static str {
                match self {
                    $(Opcode::$name => $mnemonic,)*
                }
            }

            pub fn category(self) -> Category {
                match self {
                    $(Opcode::$name => Category::$category,)*
                }
            }
        }
    };
}

opcodes! {
    NOP = 0x00, "nop", Nop;
    ACONST_NULL = 0x01, "aconst_null", Constant;
    ICONST_M1 = 0x02, "iconst_m1", Constant;
    ICONST_0 = 0x03, "iconst_0", Constant;
    ICONST_1 = 0x04, "iconst_1", Constant;
    ICONST_2 = 0x05, "iconst_2", Constant;
    ICONST_3 = 0x06, "iconst_3", Constant;
    ICONST_4 = 0x07, "iconst_4", Constant;
    ICONST_5 = 0x08, "iconst_5", Constant;
    LCONST_0 = 0x09, "lconst_0", Constant;
    LCONST_1 = 0x0a, "lconst_1", Constant;
    FCONST_0 = 0x0b, "fconst_0", Constant;
    FCONST_1 = 0x0c, "fconst_1", Constant;
    FCONST_2 = 0x0d, "fconst_2", Constant;
    DCONST_0 = 0x0e, "dconst_0", Constant;
    DCONST_1 = 0x0f, "dconst_1", Constant;
    BIPUSH = 0x10, "bipush", Constant;
    SIPUSH = 0x11, "sipush", Constant;
    LDC = 0x12, "ldc", Constant;
    LDC_W = 0x13, "ldc_w", Constant;
    LDC2_W = 0x14, "ldc2_w", Constant;
    ILOAD = 0x15, "iload", Local;
    LLOAD = 0x16, "lload", Local;
    FLOAD = 0x17, "fload", Local;
    DLOAD = 0x18, "dload", Local;
    ALOAD = 0x19, "aload", Local;
    ILOAD_0 = 0x1a, "iload_0", Local;
    ILOAD_1 = 0x1b, "iload_1", Local;
    ILOAD_2 = 0x1c, "iload_2", Local;
    ILOAD_3 = 0x1d, "iload_3", Local;
    LLOAD_0 = 0x1e, "lload_0", Local;
    LLOAD_1 = 0x1f, "lload_1", Local;
    LLOAD_2 = 0x20, "lload_2", Local;
    LLOAD_3 = 0x21, "lload_3", Local;
    FLOAD_0 = 0x22, "fload_0", Local;
    FLOAD_1 = 0x23, "fload_1", Local;
    FLOAD_2 = 0x24, "fload_2", Local;
    FLOAD_3 = 0x25, "fload_3", Local;
    DLOAD_0 = 0x26, "dload_0", Local;
    DLOAD_1 = 0x27, "dload_1", Local;
    DLOAD_2 = 0x28, "dload_2", Local;
    DLOAD_3 = 0x29, "dload_3", Local;
    ALOAD_0 = 0x2a, "aload_0", Local;
    ALOAD_1 = 0x2b, "aload_1", Local;
    ALOAD_2 = 0x2c, "aload_2", Local;
    ALOAD_3 = 0x2d, "aload_3", Local;
    IALOAD = 0x2e, "iaload", Array;
    LALOAD = 0x2f, "laload", Array;
    FALOAD = 0x30, "faload", Array;
    DALOAD = 0x31, "daload", Array;
    AALOAD = 0x32, "aaload", Array;
    BALOAD = 0x33, "baload", Array;
    CALOAD = 0x34, "caload", Array;
    SALOAD = 0x35, "saload", Array;
    ISTORE = 0x36, "istore", Local;
    LSTORE = 0x37, "lstore", Local;
    FSTORE = 0x38, "fstore", Local;
    DSTORE = 0x39, "dstore", Local;
    ASTORE = 0x3a, "astore", Local;
    ISTORE_0 = 0x3b, "istore_0", Local;
    ISTORE_1 = 0x3c, "istore_1", Local;
    ISTORE_2 = 0x3d, "istore_2", Local;
    ISTORE_3 = 0x3e, "istore_3", Local;
    LSTORE_0 = 0x3f, "lstore_0", Local;
    LSTORE_1 = 0x40, "lstore_1", Local;
    LSTORE_2 = 0x41, "lstore_2", Local;
    LSTORE_3 = 0x42, "lstore_3", Local;
    FSTORE_0 = 0x43, "fstore_0", Local;
    FSTORE_1 = 0x44, "fstore_1", Local;
    FSTORE_2 = 0x45, "fstore_2", Local;
    FSTORE_3 = 0x46, "fstore_3", Local;
    DSTORE_0 = 0x47, "dstore_0", Local;
    DSTORE_1 = 0x48, "dstore_1", Local;
    DSTORE_2 = 0x49, "dstore_2", Local;
    DSTORE_3 = 0x4a, "dstore_3", Local;
    ASTORE_0 = 0x4b, "astore_0", Local;
    ASTORE_1 = 0x4c, "astore_1", Local;
    ASTORE_2 = 0x4d, "astore_2", Local;
    ASTORE_3 = 0x4e, "astore_3", Local;
    IASTORE = 0x4f, "iastore", Array;
    LASTORE = 0x50, "lastore", Array;
    FASTORE = 0x51, "fastore", Array;
    DASTORE = 0x52, "dastore", Array;
    AASTORE = 0x53, "aastore", Array;
    BASTORE = 0x54, "bastore", Array;
    CASTORE = 0x55, "castore", Array;
    SASTORE = 0x56, "sastore", Array;
    POP = 0x57, "pop", Stack;
    POP2 = 0x58, "pop2", Stack;
    DUP = 0x59, "dup", Stack;
    DUP_X1 = 0x5a, "dup_x1", Stack;
    DUP_X2 = 0x5b, "dup_x2", Stack;
    DUP2 = 0x5c, "dup2", Stack;
    DUP2_X1 = 0x5d, "dup2_x1", Stack;
    DUP2_X2 = 0x5e, "dup2_x2", Stack;
    SWAP = 0x5f, "swap", Stack;
    IADD = 0x60, "iadd", Arithmetic;
    LADD = 0x61, "ladd", Arithmetic;
    FADD = 0x62, "fadd", Arithmetic;
    DADD = 0x63, "dadd", Arithmetic;
    ISUB = 0x64, "isub", Arithmetic;
    LSUB = 0x65, "lsub", Arithmetic;
    FSUB = 0x66, "fsub", Arithmetic;
    DSUB = 0x67, "dsub", Arithmetic;
    IMUL = 0x68, "imul", Arithmetic;
    LMUL = 0x69, "lmul", Arithmetic;
    FMUL = 0x6a, "fmul", Arithmetic;
    DMUL = 0x6b, "dmul", Arithmetic;
    IDIV = 0x6c, "idiv", Arithmetic;
    LDIV = 0x6d, "ldiv", Arithmetic;
    FDIV = 0x6e, "fdiv", Arithmetic;
    DDIV = 0x6f, "ddiv", Arithmetic;
    IREM = 0x70, "irem", Arithmetic;
    LREM = 0x71, "lrem", Arithmetic;
    FREM = 0x72, "frem", Arithmetic;
    DREM = 0x73, "drem", Arithmetic;
    INEG = 0x74, "ineg", Arithmetic;
    LNEG = 0x75, "lneg", Arithmetic;
    FNEG = 0x76, "fneg", Arithmetic;
    DNEG = 0x77, "dneg", Arithmetic;
    ISHL = 0x78, "ishl", Arithmetic;
    LSHL = 0x79, "lshl", Arithmetic;
    ISHR = 0x7a, "ishr", Arithmetic;
    LSHR = 0x7b, "lshr", Arithmetic;
    IUSHR = 0x7c, "iushr", Arithmetic;
    LUSHR = 0x7d, "lushr", Arithmetic;
    IAND = 0x7e, "iand", Arithmetic;
    LAND = 0x7f, "land", Arithmetic;
    IOR = 0x80, "ior", Arithmetic;
    LOR = 0x81, "lor", Arithmetic;
    IXOR = 0x82, "ixor", Arithmetic;
    LXOR = 0x83, "lxor", Arithmetic;
    IINC = 0x84, "iinc", Local;
    I2L = 0x85, "i2l", Cast;
    I2F = 0x86, "i2f", Cast;
    I2D = 0x87, "i2d", Cast;
    L2I = 0x88, "l2i", Cast;
    L2F = 0x89, "l2f", Cast;
    L2D = 0x8a, "l2d", Cast;
    F2I = 0x8b, "f2i", Cast;
    F2L = 0x8c, "f2l", Cast;
    F2D = 0x8d, "f2d", Cast;
    D2I = 0x8e, "d2i", Cast;
    D2L = 0x8f, "d2l", Cast;
    D2F = 0x90, "d2f", Cast;
    I2B = 0x91, "i2b", Cast;
    I2C = 0x92, "i2c", Cast;
    I2S = 0x93, "i2s", Cast;
    LCMP = 0x94, "lcmp", Arithmetic;
    FCMPL = 0x95, "fcmpl", Arithmetic;
    FCMPG = 0x96, "fcmpg", Arithmetic;
    DCMPL = 0x97, "dcmpl", Arithmetic;
    DCMPG = 0x98, "dcmpg", Arithmetic;
    IFEQ = 0x99, "ifeq", Branch;
    IFNE = 0x9a, "ifne", Branch;
    IFLT = 0x9b, "iflt", Branch;
    IFGE = 0x9c, "ifge", Branch;
    IFGT = 0x9d, "ifgt", Branch;
    IFLE = 0x9e, "ifle", Branch;
    IF_ICMPEQ = 0x9f, "if_icmpeq", Branch;
    IF_ICMPNE = 0xa0, "if_icmpne", Branch;
    IF_ICMPLT = 0xa1, "if_icmplt", Branch;
    IF_ICMPGE = 0xa2, "if_icmpge", Branch;
    IF_ICMPGT = 0xa3, "if_icmpgt", Branch;
    IF_ICMPLE = 0xa4, "if_icmple", Branch;
    IF_ACMPEQ = 0xa5, "if_acmpeq", Branch;
    IF_ACMPNE = 0xa6, "if_acmpne", Branch;
    GOTO = 0xa7, "goto", Branch;
    JSR = 0xa8, "jsr", Branch;
    RET = 0xa9, "ret", Branch;
    TABLESWITCH = 0xaa, "tableswitch", Branch;
    LOOKUPSWITCH = 0xab, "lookupswitch", Branch;
    IRETURN = 0xac, "ireturn", Return;
    LRETURN = 0xad, "lreturn", Return;
    FRETURN = 0xae, "freturn", Return;
    DRETURN = 0xaf, "dreturn", Return;
    ARETURN = 0xb0, "areturn", Return;
    RETURN = 0xb1, "return", Return;
    GETSTATIC = 0xb2, "getstatic", Field;
    PUTSTATIC = 0xb3, "putstatic", Field;
    GETFIELD = 0xb4, "getfield", Field;
    PUTFIELD = 0xb5, "putfield", Field;
    INVOKEVIRTUAL = 0xb6, "invokevirtual", Method;
    INVOKESPECIAL = 0xb7, "invokespecial", Method;
    INVOKESTATIC = 0xb8, "invokestatic", Method;
    INVOKEINTERFACE = 0xb9, "invokeinterface", Method;
    INVOKEDYNAMIC = 0xba, "invokedynamic", Method;
    NEW = 0xbb, "new", Object;
    NEWARRAY = 0xbc, "newarray", Array;
    ANEWARRAY = 0xbd, "anewarray", Array;
    ARRAYLENGTH = 0xbe, "arraylength", Array;
    ATHROW = 0xbf, "athrow", Return;
    CHECKCAST = 0xc0, "checkcast", Cast;
    INSTANCEOF = 0xc1, "instanceof", Object;
    MONITORENTER = 0xc2, "monitorenter", Object;
    MONITOREXIT = 0xc3, "monitorexit", Object;
    WIDE = 0xc4, "wide", Local;
    MULTIANEWARRAY = 0xc5, "multianewarray", Array;
    IFNULL = 0xc6, "ifnull", Branch;
    IFNONNULL = 0xc7, "ifnonnull", Branch;
    GOTO_W = 0xc8, "goto_w", Branch;
    JSR_W = 0xc9, "jsr_w", Branch;
}

/// Shape of the operands an opcode carries in the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperandForm {
    Simple,
    Int,
    Var,
    Iinc,
    Type,
    Field,
    Method,
    InvokeDynamic,
    Jump,
    Ldc,
    TableSwitch,
    LookupSwitch,
    MultiANewArray,
    Wide,
}

impl fmt::Display for OperandForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperandForm::Simple => "no",
            OperandForm::Int => "integer",
            OperandForm::Var => "local variable",
            OperandForm::Iinc => "increment",
            OperandForm::Type => "type",
            OperandForm::Field => "field",
            OperandForm::Method => "method",
            OperandForm::InvokeDynamic => "call site",
            OperandForm::Jump => "jump",
            OperandForm::Ldc => "constant",
            OperandForm::TableSwitch => "table switch",
            OperandForm::LookupSwitch => "lookup switch",
            OperandForm::MultiANewArray => "multi-dimensional array",
            OperandForm::Wide => "wide",
        };
        write!(f, "{}", name)
    }
}

impl Opcode {
    pub fn from_u8(code: u8) -> Option<Opcode> {
        CATALOG.by_code[code as usize]
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Opcode> {
        CATALOG.by_mnemonic.get(mnemonic).copied()
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn form(self) -> OperandForm {
        use Opcode::*;
        match self {
            BIPUSH | SIPUSH | NEWARRAY => OperandForm::Int,
            ILOAD | LLOAD | FLOAD | DLOAD | ALOAD | ISTORE | LSTORE | FSTORE | DSTORE | ASTORE
            | RET => OperandForm::Var,
            IINC => OperandForm::Iinc,
            NEW | ANEWARRAY | CHECKCAST | INSTANCEOF => OperandForm::Type,
            GETSTATIC | PUTSTATIC | GETFIELD | PUTFIELD => OperandForm::Field,
            INVOKEVIRTUAL | INVOKESPECIAL | INVOKESTATIC | INVOKEINTERFACE => OperandForm::Method,
            INVOKEDYNAMIC => OperandForm::InvokeDynamic,
            IFEQ | IFNE | IFLT | IFGE | IFGT | IFLE | IF_ICMPEQ | IF_ICMPNE | IF_ICMPLT
            | IF_ICMPGE | IF_ICMPGT | IF_ICMPLE | IF_ACMPEQ | IF_ACMPNE | GOTO | JSR | IFNULL
            | IFNONNULL | GOTO_W | JSR_W => OperandForm::Jump,
            LDC | LDC_W | LDC2_W => OperandForm::Ldc,
            TABLESWITCH => OperandForm::TableSwitch,
            LOOKUPSWITCH => OperandForm::LookupSwitch,
            MULTIANEWARRAY => OperandForm::MultiANewArray,
            WIDE => OperandForm::Wide,
            _ => OperandForm::Simple,
        }
    }

    pub fn is_field_read(self) -> bool {
        matches!(self, Opcode::GETFIELD | Opcode::GETSTATIC)
    }

    pub fn is_field_write(self) -> bool {
        matches!(self, Opcode::PUTFIELD | Opcode::PUTSTATIC)
    }

    pub fn is_unconditional_jump(self) -> bool {
        matches!(
            self,
            Opcode::GOTO | Opcode::GOTO_W | Opcode::JSR | Opcode::JSR_W | Opcode::RET
        )
    }

    /// Whether control never continues to the next instruction.
    pub fn ends_flow(self) -> bool {
        self.category() == Category::Return
            || matches!(
                self,
                Opcode::GOTO
                    | Opcode::GOTO_W
                    | Opcode::RET
                    | Opcode::TABLESWITCH
                    | Opcode::LOOKUPSWITCH
            )
    }

    /// Local slot encoded in the short load forms (`iload_0` .. `aload_3`).
    pub fn implicit_load_slot(self) -> Option<u16> {
        let code = self.code();
        (0x1a..=0x2d)
            .contains(&code)
            .then(|| u16::from((code - 0x1a) % 4))
    }

    /// Local slot encoded in the short store forms (`istore_0` .. `astore_3`).
    pub fn implicit_store_slot(self) -> Option<u16> {
        let code = self.code();
        (0x3b..=0x4e)
            .contains(&code)
            .then(|| u16::from((code - 0x3b) % 4))
    }

    pub fn is_local_load(self) -> bool {
        matches!(
            self,
            Opcode::ILOAD | Opcode::LLOAD | Opcode::FLOAD | Opcode::DLOAD | Opcode::ALOAD
        ) || self.implicit_load_slot().is_some()
    }

    pub fn is_local_store(self) -> bool {
        matches!(
            self,
            Opcode::ISTORE | Opcode::LSTORE | Opcode::FSTORE | Opcode::DSTORE | Opcode::ASTORE
        ) || self.implicit_store_slot().is_some()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

struct OperationCatalog {
    by_code: [Option<Opcode>; 256],
    by_mnemonic: HashMap<&'static str, Opcode>,
}

impl OperationCatalog {
    fn build() -> Self {
        let mut by_code = [None; 256];
        let mut by_mnemonic = HashMap::with_capacity(Opcode::ALL.len());

        for &opcode in Opcode::ALL {
            by_code[opcode.code() as usize] = Some(opcode);
            by_mnemonic.insert(opcode.mnemonic(), opcode);
        }

        Self {
            by_code,
            by_mnemonic,
        }
    }
}

static CATALOG: Lazy<OperationCatalog> = Lazy::new(OperationCatalog::build);

pub fn category_of(opcode: Opcode) -> Category {
    opcode.category()
}

/// Whether the opcode pushes a value that is fully determined by the opcode itself.
pub fn is_constant_push(opcode: Opcode) -> bool {
    canonical_value(opcode).is_some()
}

pub fn canonical_value(opcode: Opcode) -> Option<InitialValue> {
    use Opcode::*;
    let value = match opcode {
        ACONST_NULL => InitialValue::Null,
        ICONST_M1 => InitialValue::Int(-1),
        ICONST_0 => InitialValue::Int(0),
        ICONST_1 => InitialValue::Int(1),
        ICONST_2 => InitialValue::Int(2),
        ICONST_3 => InitialValue::Int(3),
        ICONST_4 => InitialValue::Int(4),
        ICONST_5 => InitialValue::Int(5),
        LCONST_0 => InitialValue::Long(0),
        LCONST_1 => InitialValue::Long(1),
        FCONST_0 => InitialValue::float(0.0),
        FCONST_1 => InitialValue::float(1.0),
        FCONST_2 => InitialValue::float(2.0),
        DCONST_0 => InitialValue::double(0.0),
        DCONST_1 => InitialValue::double(1.0),
        _ => return None,
    };
    Some(value)
}

/// The conditional branches, closed over every opcode that may or may not transfer control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConditionalBranch {
    Ifeq,
    Ifne,
    Iflt,
    Ifge,
    Ifgt,
    Ifle,
    IfIcmpeq,
    IfIcmpne,
    IfIcmplt,
    IfIcmpge,
    IfIcmpgt,
    IfIcmple,
    IfAcmpeq,
    IfAcmpne,
    Ifnull,
    Ifnonnull,
}

/// What a conditional branch compares its popped operand(s) against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BranchOperands {
    AgainstZero,
    AgainstNull,
    TwoOperands,
}

impl ConditionalBranch {
    pub const ALL: [ConditionalBranch; 16] = [
        ConditionalBranch::Ifeq,
        ConditionalBranch::Ifne,
        ConditionalBranch::Iflt,
        ConditionalBranch::Ifge,
        ConditionalBranch::Ifgt,
        ConditionalBranch::Ifle,
        ConditionalBranch::IfIcmpeq,
        ConditionalBranch::IfIcmpne,
        ConditionalBranch::IfIcmplt,
        ConditionalBranch::IfIcmpge,
        ConditionalBranch::IfIcmpgt,
        ConditionalBranch::IfIcmple,
        ConditionalBranch::IfAcmpeq,
        ConditionalBranch::IfAcmpne,
        ConditionalBranch::Ifnull,
        ConditionalBranch::Ifnonnull,
    ];

    pub fn from_opcode(opcode: Opcode) -> Option<Self> {
        Self::ALL.into_iter().find(|branch| branch.opcode() == opcode)
    }

    pub fn opcode(self) -> Opcode {
        match self {
            ConditionalBranch::Ifeq => Opcode::IFEQ,
            ConditionalBranch::Ifne => Opcode::IFNE,
            ConditionalBranch::Iflt => Opcode::IFLT,
            ConditionalBranch::Ifge => Opcode::IFGE,
            ConditionalBranch::Ifgt => Opcode::IFGT,
            ConditionalBranch::Ifle => Opcode::IFLE,
            ConditionalBranch::IfIcmpeq => Opcode::IF_ICMPEQ,
            ConditionalBranch::IfIcmpne => Opcode::IF_ICMPNE,
            ConditionalBranch::IfIcmplt => Opcode::IF_ICMPLT,
            ConditionalBranch::IfIcmpge => Opcode::IF_ICMPGE,
            ConditionalBranch::IfIcmpgt => Opcode::IF_ICMPGT,
            ConditionalBranch::IfIcmple => Opcode::IF_ICMPLE,
            ConditionalBranch::IfAcmpeq => Opcode::IF_ACMPEQ,
            ConditionalBranch::IfAcmpne => Opcode::IF_ACMPNE,
            ConditionalBranch::Ifnull => Opcode::IFNULL,
            ConditionalBranch::Ifnonnull => Opcode::IFNONNULL,
        }
    }

    pub fn operands(self) -> BranchOperands {
        match self {
            ConditionalBranch::Ifeq
            | ConditionalBranch::Ifne
            | ConditionalBranch::Iflt
            | ConditionalBranch::Ifge
            | ConditionalBranch::Ifgt
            | ConditionalBranch::Ifle => BranchOperands::AgainstZero,
            ConditionalBranch::Ifnull | ConditionalBranch::Ifnonnull => {
                BranchOperands::AgainstNull
            }
            ConditionalBranch::IfIcmpeq
            | ConditionalBranch::IfIcmpne
            | ConditionalBranch::IfIcmplt
            | ConditionalBranch::IfIcmpge
            | ConditionalBranch::IfIcmpgt
            | ConditionalBranch::IfIcmple
            | ConditionalBranch::IfAcmpeq
            | ConditionalBranch::IfAcmpne => BranchOperands::TwoOperands,
        }
    }

    /// For the zero family: whether execution falls through (does not jump) when the operand is
    /// zero.
    pub fn continues_on_zero(self) -> Option<bool> {
        match self {
            ConditionalBranch::Ifne | ConditionalBranch::Iflt | ConditionalBranch::Ifgt => {
                Some(true)
            }
            ConditionalBranch::Ifeq | ConditionalBranch::Ifge | ConditionalBranch::Ifle => {
                Some(false)
            }
            _ => None,
        }
    }

    /// For `ifnull`/`ifnonnull`: whether execution falls through when the operand is null.
    pub fn continues_on_null(self) -> Option<bool> {
        match self {
            ConditionalBranch::Ifnonnull => Some(true),
            ConditionalBranch::Ifnull => Some(false),
            _ => None,
        }
    }

    /// Two-operand branches and the numeric compares feeding zero-family branches.
    pub fn is_comparison(self) -> bool {
        self.operands() == BranchOperands::TwoOperands
    }
}

/// The numeric compare instructions that reduce two operands to -1, 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumericComparison {
    Lcmp,
    Fcmpl,
    Fcmpg,
    Dcmpl,
    Dcmpg,
}

impl NumericComparison {
    pub const ALL: [NumericComparison; 5] = [
        NumericComparison::Lcmp,
        NumericComparison::Fcmpl,
        NumericComparison::Fcmpg,
        NumericComparison::Dcmpl,
        NumericComparison::Dcmpg,
    ];

    pub fn from_opcode(opcode: Opcode) -> Option<Self> {
        Self::ALL.into_iter().find(|cmp| cmp.opcode() == opcode)
    }

    pub fn opcode(self) -> Opcode {
        match self {
            NumericComparison::Lcmp => Opcode::LCMP,
            NumericComparison::Fcmpl => Opcode::FCMPL,
            NumericComparison::Fcmpg => Opcode::FCMPG,
            NumericComparison::Dcmpl => Opcode::DCMPL,
            NumericComparison::Dcmpg => Opcode::DCMPG,
        }
    }
}

/// Numeric compares plus the two-operand conditional branches.
pub fn is_comparison(opcode: Opcode) -> bool {
    NumericComparison::from_opcode(opcode).is_some()
        || ConditionalBranch::from_opcode(opcode).is_some_and(ConditionalBranch::is_comparison)
}
