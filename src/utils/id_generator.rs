use rand::Rng;

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const ID_LENGTH: usize = 7;
const PREFIX: &str = "unt_";

/// Genera un ID de unidad con formato `unt_` + 7 caracteres `[a-z0-9]`
pub fn generate_unit_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..ID_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}{}", PREFIX, suffix)
}
