pub const TEST_RISC0_BATCH_ELF: &[u8] = include_bytes!(
    "../../../guest/target/riscv32im-risc0-zkvm-elf/release/deps/risc0_batch-7905a633e193ead0.bin"
);
pub const TEST_RISC0_BATCH_ID: [u32; 8] = [
    1760141592, 3497138582, 2047383139, 2019117838, 3959581427, 3910924011, 3450604767, 49656800,
];
