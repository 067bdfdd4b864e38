pub const SGX_INSTANCE_SIGNATURE_PREFIX: &str = "Signature:";
pub const SGX_PUBLIC_KEY_PREFIX: &str = "Public key:";
#[allow(dead_code)]
pub const SGX_PROOF_PREFIX: &str = "Quote:";
pub const SGX_PARENT_DIR: &str = "sgx";
pub const SGX_PROOF_LEN: usize = 89;
#[allow(dead_code)]
pub const PSE_ZK_PARENT_DIR: &str = "pse-zk";
pub const RAIKO_GUEST_EXECUTABLE: &str = "raiko-guest";
