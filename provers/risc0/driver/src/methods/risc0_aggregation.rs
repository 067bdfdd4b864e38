
pub const RISC0_AGGREGATION_ELF: &[u8] = include_bytes!("../../../guest/target/riscv32im-risc0-zkvm-elf/release/risc0-aggregation.bin");
pub const RISC0_AGGREGATION_ID: [u32; 8] = [2545354074, 2365130789, 315717149, 2015146433, 2829715641, 665980564, 4075459846, 45979068];
