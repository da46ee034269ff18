use rand::Rng;

/// Generate a human-readable reference label for an item report.
///
/// Format: `P-RRRR-NN` where `P` is the first letter of the location
/// (uppercased, `X` when the location has no ASCII letter), `RRRR` a
/// random four-digit number and `NN` the running report count modulo
/// 100. Purely cosmetic — collisions are possible and harmless.
pub fn generate_ref_no(location: &str, item_count: u64) -> String {
    let prefix = location
        .chars()
        .find(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_uppercase())
        .unwrap_or('X');
    let random: u32 = rand::thread_rng().gen_range(1000..=9999);
    let running = (item_count + 1) % 100;
    format!("{}-{}-{:02}", prefix, random, running)
}
