use uuid::Uuid;

/// Length of a Passenger Name Record code.
pub const PNR_LEN: usize = 8;

/// Generate a PNR: 8 uppercase hex characters truncated from a v4 UUID.
///
/// Collision-resistant enough for practical uniqueness across a process
/// lifetime (32 random bits over ~16^8 values); not a cryptographic token.
pub fn generate() -> String {
    let digest = Uuid::new_v4().simple().to_string();
    digest[..PNR_LEN].to_uppercase()
}
