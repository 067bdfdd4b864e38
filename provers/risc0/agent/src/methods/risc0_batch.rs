pub const RISC0_BATCH_ELF: &[u8] =
    include_bytes!("../../../guest/target/riscv32im-risc0-zkvm-elf/release/risc0-batch.bin");
pub const RISC0_BATCH_ID: [u32; 8] = [
    2520064561, 878258458, 203028928, 3855939578, 263608834, 458767600, 2596161865, 1360647998,
];
