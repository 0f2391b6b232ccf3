/*
    sim86
    Copyright 2022-2025 Daniel Balsom

    Permission is hereby granted, free of charge, to any person obtaining a
    copy of this software and associated documentation files (the “Software”),
    to deal in the Software without restriction, including without limitation
    the rights to use, copy, modify, merge, publish, distribute, sublicense,
    and/or sell copies of the Software, and to permit persons to whom the
    Software is furnished to do so, subject to the following conditions:

    The above copyright notice and this permission notice shall be included in
    all copies or substantial portions of the Software.

    THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
    IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
    FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
    AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
    LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
    FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
    DEALINGS IN THE SOFTWARE.
*/

use std::fmt::{Display, Formatter};

/// Every opcode variant the decoder distinguishes. Variants of one mnemonic family differ in
/// encoding shape, which drives how their operands are decoded.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum InstructionType {
    #[default]
    Invalid,

    MovRegMemToFromReg,
    MovImToRegMem,
    MovImToReg,
    MovMemToAcc,
    MovAccToMem,
    MovRegMemToSegReg,
    MovSegRegToRegMem,

    PushRegMem,
    PushReg,
    PushSegReg,

    PopRegMem,
    PopReg,
    PopSegReg,

    XchgRegMemWithReg,
    XchgRegWithAcc,

    InFixedPort,
    InVariablePort,
    OutFixedPort,
    OutVariablePort,

    Xlat,
    Lea,
    Lds,
    Les,
    Lahf,
    Sahf,
    Pushf,
    Popf,

    AddRegMemWithRegToEither,
    AddImToRegMem,
    AddImToAcc,

    AdcRegMemWithRegToEither,
    AdcImToRegMem,
    AdcImToAcc,

    IncRegMem,
    IncReg,
    Aaa,
    Daa,

    SubRegMemWithRegToEither,
    SubImFromRegMem,
    SubImFromAcc,

    SbbRegMemWithRegToEither,
    SbbImFromRegMem,
    SbbImFromAcc,

    DecRegMem,
    DecReg,
    Neg,

    CmpRegMemAndReg,
    CmpImWithRegMem,
    CmpImWithAcc,

    Aas,
    Das,
    Mul,
    Imul,
    Aam,
    Div,
    Idiv,
    Aad,
    Cbw,
    Cwd,

    Not,
    Shl,
    Shr,
    Sar,
    Rol,
    Ror,
    Rcl,
    Rcr,

    AndRegMemWithRegToEither,
    AndImToRegMem,
    AndImToAcc,

    TestRegMemAndReg,
    TestImAndRegMem,
    TestImAndAcc,

    OrRegMemWithRegToEither,
    OrImToRegMem,
    OrImToAcc,

    XorRegMemWithRegToEither,
    XorImToRegMem,
    XorImToAcc,

    Rep,
    Repne,
    Movs,
    Cmps,
    Scas,
    Lods,
    Stos,

    CallDirectWithinSegment,
    CallIndirectWithinSegment,
    CallDirectIntersegment,
    CallIndirectIntersegment,

    JmpDirectWithinSegment,
    JmpDirectWithinSegmentShort,
    JmpIndirectWithinSegment,
    JmpDirectIntersegment,
    JmpIndirectIntersegment,

    Ret,
    RetImm,
    RetIntersegment,
    RetIntersegmentImm,

    Jo,
    Jno,
    Jb,
    Jnb,
    Je,
    Jne,
    Jbe,
    Jnbe,
    Js,
    Jns,
    Jp,
    Jnp,
    Jl,
    Jnl,
    Jle,
    Jnle,
    Loop,
    Loopz,
    Loopnz,
    Jcxz,

    Int,
    Int3,
    Into,
    Iret,

    Clc,
    Cmc,
    Stc,
    Cld,
    Std,
    Cli,
    Sti,
    Hlt,
    Wait,
    Esc,
    Lock,
}

use InstructionType::*;

/// Conditional jumps 0x70-0x7F in opcode order.
pub const CONDITIONAL_JUMP_LUT: [InstructionType; 16] = [
    Jo, Jno, Jb, Jnb, Je, Jne, Jbe, Jnbe, Js, Jns, Jp, Jnp, Jl, Jnl, Jle, Jnle,
];

impl InstructionType {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Invalid => "(bad)",
            MovRegMemToFromReg | MovImToRegMem | MovImToReg | MovMemToAcc | MovAccToMem | MovRegMemToSegReg
            | MovSegRegToRegMem => "mov",
            PushRegMem | PushReg | PushSegReg => "push",
            PopRegMem | PopReg | PopSegReg => "pop",
            XchgRegMemWithReg | XchgRegWithAcc => "xchg",
            InFixedPort | InVariablePort => "in",
            OutFixedPort | OutVariablePort => "out",
            Xlat => "xlat",
            Lea => "lea",
            Lds => "lds",
            Les => "les",
            Lahf => "lahf",
            Sahf => "sahf",
            Pushf => "pushf",
            Popf => "popf",
            AddRegMemWithRegToEither | AddImToRegMem | AddImToAcc => "add",
            AdcRegMemWithRegToEither | AdcImToRegMem | AdcImToAcc => "adc",
            IncRegMem | IncReg => "inc",
            Aaa => "aaa",
            Daa => "daa",
            SubRegMemWithRegToEither | SubImFromRegMem | SubImFromAcc => "sub",
            SbbRegMemWithRegToEither | SbbImFromRegMem | SbbImFromAcc => "sbb",
            DecRegMem | DecReg => "dec",
            Neg => "neg",
            CmpRegMemAndReg | CmpImWithRegMem | CmpImWithAcc => "cmp",
            Aas => "aas",
            Das => "das",
            Mul => "mul",
            Imul => "imul",
            Aam => "aam",
            Div => "div",
            Idiv => "idiv",
            Aad => "aad",
            Cbw => "cbw",
            Cwd => "cwd",
            Not => "not",
            Shl => "shl",
            Shr => "shr",
            Sar => "sar",
            Rol => "rol",
            Ror => "ror",
            Rcl => "rcl",
            Rcr => "rcr",
            AndRegMemWithRegToEither | AndImToRegMem | AndImToAcc => "and",
            TestRegMemAndReg | TestImAndRegMem | TestImAndAcc => "test",
            OrRegMemWithRegToEither | OrImToRegMem | OrImToAcc => "or",
            XorRegMemWithRegToEither | XorImToRegMem | XorImToAcc => "xor",
            Rep => "rep",
            Repne => "repne",
            Movs => "movs",
            Cmps => "cmps",
            Scas => "scas",
            Lods => "lods",
            Stos => "stos",
            CallDirectWithinSegment | CallIndirectWithinSegment | CallDirectIntersegment
            | CallIndirectIntersegment => "call",
            JmpDirectWithinSegment
            | JmpDirectWithinSegmentShort
            | JmpIndirectWithinSegment
            | JmpDirectIntersegment
            | JmpIndirectIntersegment => "jmp",
            Ret | RetImm => "ret",
            RetIntersegment | RetIntersegmentImm => "retf",
            Jo => "jo",
            Jno => "jno",
            Jb => "jb",
            Jnb => "jnb",
            Je => "je",
            Jne => "jne",
            Jbe => "jbe",
            Jnbe => "jnbe",
            Js => "js",
            Jns => "jns",
            Jp => "jp",
            Jnp => "jnp",
            Jl => "jl",
            Jnl => "jnl",
            Jle => "jle",
            Jnle => "jnle",
            Loop => "loop",
            Loopz => "loopz",
            Loopnz => "loopnz",
            Jcxz => "jcxz",
            Int => "int",
            Int3 => "int3",
            Into => "into",
            Iret => "iret",
            Clc => "clc",
            Cmc => "cmc",
            Stc => "stc",
            Cld => "cld",
            Std => "std",
            Cli => "cli",
            Sti => "sti",
            Hlt => "hlt",
            Wait => "wait",
            Esc => "esc",
            Lock => "lock",
        }
    }

    pub fn is_im_to_acc(&self) -> bool {
        matches!(
            self,
            AddImToAcc
                | AdcImToAcc
                | SubImFromAcc
                | SbbImFromAcc
                | CmpImWithAcc
                | AndImToAcc
                | TestImAndAcc
                | OrImToAcc
                | XorImToAcc
        )
    }

    /// Forms encoded as opcode + mod/reg/rm where `reg` names a register operand or a secondary
    /// opcode and `r/m` names the other operand.
    pub fn is_reg_mem_with_reg(&self) -> bool {
        matches!(
            self,
            MovRegMemToFromReg
                | MovSegRegToRegMem
                | MovRegMemToSegReg
                | AddRegMemWithRegToEither
                | AdcRegMemWithRegToEither
                | IncRegMem
                | SubRegMemWithRegToEither
                | SbbRegMemWithRegToEither
                | DecRegMem
                | Neg
                | CmpRegMemAndReg
                | XchgRegMemWithReg
                | Lea
                | Lds
                | Les
                | Mul
                | Imul
                | Div
                | Idiv
                | Not
                | AndRegMemWithRegToEither
                | TestRegMemAndReg
                | OrRegMemWithRegToEither
                | XorRegMemWithRegToEither
                | CallIndirectWithinSegment
                | CallIndirectIntersegment
                | JmpIndirectWithinSegment
                | JmpIndirectIntersegment
                | PushRegMem
                | PopRegMem
        ) || self.is_shift_or_rotate()
    }

    pub fn is_im_to_reg_mem(&self) -> bool {
        matches!(
            self,
            MovImToRegMem
                | AddImToRegMem
                | AdcImToRegMem
                | SubImFromRegMem
                | SbbImFromRegMem
                | CmpImWithRegMem
                | AndImToRegMem
                | TestImAndRegMem
                | OrImToRegMem
                | XorImToRegMem
        )
    }

    /// The 0x80-0x83 group, where bit 1 of the opcode selects a sign-extended 8-bit immediate.
    pub fn has_sign_extension(&self) -> bool {
        matches!(
            self,
            AddImToRegMem
                | AdcImToRegMem
                | SubImFromRegMem
                | SbbImFromRegMem
                | CmpImWithRegMem
                | AndImToRegMem
                | OrImToRegMem
                | XorImToRegMem
        )
    }

    /// Forms whose word immediate has a shorter sign-extended encoding elsewhere in the group,
    /// which an assembler prefers for values in byte range.
    pub fn has_short_immediate_form(&self) -> bool {
        self.has_sign_extension() || (self.is_im_to_acc() && *self != TestImAndAcc)
    }

    /// Conditional jumps and the loop family, all taking a signed 8-bit displacement.
    pub fn is_conditional_jump(&self) -> bool {
        matches!(
            self,
            Jo | Jno
                | Jb
                | Jnb
                | Je
                | Jne
                | Jbe
                | Jnbe
                | Js
                | Jns
                | Jp
                | Jnp
                | Jl
                | Jnl
                | Jle
                | Jnle
                | Loop
                | Loopz
                | Loopnz
                | Jcxz
        )
    }

    /// Direct near call and jump forms, whose operand is a displacement relative to the next
    /// instruction.
    pub fn is_relative_branch(&self) -> bool {
        self.is_conditional_jump()
            || matches!(
                self,
                CallDirectWithinSegment | JmpDirectWithinSegment | JmpDirectWithinSegmentShort
            )
    }

    /// Width in bytes of the relative displacement of a relative branch.
    pub fn relative_displacement_len(&self) -> usize {
        match self {
            CallDirectWithinSegment | JmpDirectWithinSegment => 2,
            _ => 1,
        }
    }

    pub fn is_in_out(&self) -> bool {
        matches!(self, InFixedPort | InVariablePort | OutFixedPort | OutVariablePort)
    }

    /// Forms whose `reg` field always names the destination regardless of the direction bit.
    pub fn always_to_register(&self) -> bool {
        matches!(self, XchgRegMemWithReg | Lea | Lds | Les)
    }

    /// Forms that load an address rather than the value stored at it; their memory operand
    /// carries no size.
    pub fn is_address_load(&self) -> bool {
        matches!(self, Lea | Lds | Les)
    }

    /// Forms that operate on words even though the width bit of the opcode is clear.
    pub fn is_forced_wide(&self) -> bool {
        matches!(self, Les | Lds | Lea | MovRegMemToSegReg | MovSegRegToRegMem)
    }

    pub fn is_single_byte(&self) -> bool {
        matches!(
            self,
            Xlat | Lahf
                | Sahf
                | Pushf
                | Popf
                | Aaa
                | Daa
                | Aas
                | Das
                | Cbw
                | Cwd
                | Rep
                | Repne
                | Ret
                | RetIntersegment
                | Int3
                | Into
                | Iret
                | Clc
                | Cmc
                | Stc
                | Cld
                | Std
                | Cli
                | Sti
                | Hlt
                | Wait
                | Lock
        ) || self.is_string_manipulation()
    }

    pub fn is_string_manipulation(&self) -> bool {
        matches!(self, Movs | Cmps | Scas | Lods | Stos)
    }

    /// Forms that own a single decoded operand, stored as the destination.
    pub fn is_single_operand(&self) -> bool {
        matches!(
            self,
            IncRegMem
                | DecRegMem
                | Neg
                | Mul
                | Imul
                | Div
                | Idiv
                | Not
                | CallIndirectWithinSegment
                | CallIndirectIntersegment
                | JmpIndirectWithinSegment
                | JmpIndirectIntersegment
                | PushRegMem
                | PopRegMem
        )
    }

    /// Indirect far transfers, rendered with a `far` qualifier instead of an operand size.
    pub fn is_far_indirect(&self) -> bool {
        matches!(self, CallIndirectIntersegment | JmpIndirectIntersegment)
    }

    pub fn is_shift_or_rotate(&self) -> bool {
        matches!(self, Shl | Shr | Sar | Rol | Ror | Rcl | Rcr)
    }

    /// Forms with a word register coded in the low three bits of the opcode.
    pub fn is_single_register(&self) -> bool {
        matches!(self, PushReg | PopReg | XchgRegWithAcc | IncReg | DecReg)
    }

    pub fn is_segment_push_pop(&self) -> bool {
        matches!(self, PushSegReg | PopSegReg)
    }

    /// Forms that carry only an unsized immediate operand.
    pub fn is_immediate_only(&self) -> bool {
        matches!(self, RetImm | RetIntersegmentImm | Int)
    }

    /// The two-byte ASCII adjust forms whose second byte is the fixed base 0x0A.
    pub fn is_ascii_adjust_with_base(&self) -> bool {
        matches!(self, Aam | Aad)
    }

    pub fn is_move(&self) -> bool {
        matches!(
            self,
            MovRegMemToFromReg
                | MovImToRegMem
                | MovImToReg
                | MovMemToAcc
                | MovAccToMem
                | MovRegMemToSegReg
                | MovSegRegToRegMem
        )
    }

    pub fn is_add(&self) -> bool {
        matches!(self, AddRegMemWithRegToEither | AddImToRegMem | AddImToAcc)
    }

    pub fn is_sub(&self) -> bool {
        matches!(self, SubRegMemWithRegToEither | SubImFromRegMem | SubImFromAcc)
    }

    pub fn is_cmp(&self) -> bool {
        matches!(self, CmpRegMemAndReg | CmpImWithRegMem | CmpImWithAcc)
    }
}

impl Display for InstructionType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
