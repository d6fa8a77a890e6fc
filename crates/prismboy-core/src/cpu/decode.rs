//! Opcode decoding.
//!
//! Each opcode byte splits as `xx yyy zzz`, and `yyy` further as `pp q`.
//! Decoding tags the byte with an [`Op`] that indexes the CPU's handler
//! table; the selector fields name the register, pair, condition, ALU or
//! rotate operation the handler applies. Both 256-entry pages are built at
//! compile time.

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Nop,
    StoreSp,
    Stop,
    Jr,
    JrCond,
    LoadPairImm,
    AddHlPair,
    StoreAIndirect,
    LoadAIndirect,
    IncPair,
    DecPair,
    Inc,
    Dec,
    LoadImm,
    RotateA,
    Daa,
    Cpl,
    Scf,
    Ccf,
    Halt,
    Load,
    Alu,
    RetCond,
    StoreHighImm,
    AddSpImm,
    LoadHighImm,
    LoadHlSpImm,
    Pop,
    Ret,
    Reti,
    JpHl,
    LoadSpHl,
    JpCond,
    StoreHighC,
    StoreAAbs,
    LoadHighC,
    LoadAAbs,
    Jp,
    Prefix,
    Di,
    Ei,
    CallCond,
    Push,
    Call,
    AluImm,
    Rst,
    Rotate,
    Bit,
    Res,
    Set,
    Illegal,
}

impl Op {
    pub const COUNT: usize = Op::Illegal as usize + 1;
}

/// A decoded opcode: its tag plus the selector fields of the byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub op: Op,
    pub opcode: u8,
    pub y: u8,
    pub z: u8,
    pub p: u8,
    pub q: u8,
}

impl Instruction {
    const fn new(op: Op, opcode: u8) -> Self {
        let y = (opcode >> 3) & 7;
        Self {
            op,
            opcode,
            y,
            z: opcode & 7,
            p: y >> 1,
            q: y & 1,
        }
    }
}

pub const fn decode(opcode: u8) -> Instruction {
    let x = opcode >> 6;
    let y = (opcode >> 3) & 7;
    let z = opcode & 7;
    let p = y >> 1;
    let q = y & 1;

    let op = match x {
        0 => match z {
            0 => match y {
                0 => Op::Nop,
                1 => Op::StoreSp,
                2 => Op::Stop,
                3 => Op::Jr,
                _ => Op::JrCond,
            },
            1 if q == 0 => Op::LoadPairImm,
            1 => Op::AddHlPair,
            2 if q == 0 => Op::StoreAIndirect,
            2 => Op::LoadAIndirect,
            3 if q == 0 => Op::IncPair,
            3 => Op::DecPair,
            4 => Op::Inc,
            5 => Op::Dec,
            6 => Op::LoadImm,
            _ => match y {
                0..=3 => Op::RotateA,
                4 => Op::Daa,
                5 => Op::Cpl,
                6 => Op::Scf,
                _ => Op::Ccf,
            },
        },
        1 if y == 6 && z == 6 => Op::Halt,
        1 => Op::Load,
        2 => Op::Alu,
        _ => match z {
            0 => match y {
                0..=3 => Op::RetCond,
                4 => Op::StoreHighImm,
                5 => Op::AddSpImm,
                6 => Op::LoadHighImm,
                _ => Op::LoadHlSpImm,
            },
            1 if q == 0 => Op::Pop,
            1 => match p {
                0 => Op::Ret,
                1 => Op::Reti,
                2 => Op::JpHl,
                _ => Op::LoadSpHl,
            },
            2 => match y {
                0..=3 => Op::JpCond,
                4 => Op::StoreHighC,
                5 => Op::StoreAAbs,
                6 => Op::LoadHighC,
                _ => Op::LoadAAbs,
            },
            3 => match y {
                0 => Op::Jp,
                1 => Op::Prefix,
                6 => Op::Di,
                7 => Op::Ei,
                _ => Op::Illegal,
            },
            4 if y < 4 => Op::CallCond,
            4 => Op::Illegal,
            5 if q == 0 => Op::Push,
            5 if p == 0 => Op::Call,
            5 => Op::Illegal,
            6 => Op::AluImm,
            _ => Op::Rst,
        },
    };
    Instruction::new(op, opcode)
}

/// Decodes the byte following the 0xCB prefix.
pub const fn decode_prefixed(opcode: u8) -> Instruction {
    let op = match opcode >> 6 {
        0 => Op::Rotate,
        1 => Op::Bit,
        2 => Op::Res,
        _ => Op::Set,
    };
    Instruction::new(op, opcode)
}

const fn build_page(prefixed: bool) -> [Instruction; 256] {
    let mut page = [Instruction::new(Op::Illegal, 0); 256];
    let mut i = 0;
    while i < 256 {
        page[i] = if prefixed {
            decode_prefixed(i as u8)
        } else {
            decode(i as u8)
        };
        i += 1;
    }
    page
}

pub static MAIN_PAGE: [Instruction; 256] = build_page(false);
pub static PREFIXED_PAGE: [Instruction; 256] = build_page(true);
