pub const RISC0_AGGREGATION_ELF: &[u8] =
    include_bytes!("../../../guest/target/riscv32im-risc0-zkvm-elf/release/risc0-aggregation.bin");
pub const RISC0_AGGREGATION_ID: [u32; 8] = [
    1212948969, 3601893123, 2771200129, 212516571, 2027458856, 392491340, 1350096034, 1551324411,
];
