
pub const ECDSA_ELF: &[u8] = include_bytes!("../../../guest/target/riscv32im-risc0-zkvm-elf/release/ecdsa");
pub const ECDSA_ID: [u32; 8] = [1930164840, 4054596513, 2882493560, 1424881730, 3057661652, 3456098792, 879571237, 2097836975];
