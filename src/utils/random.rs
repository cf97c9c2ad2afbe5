/// Uniform-ish index in `0..max` from OS randomness.
pub fn get_random_index(max: usize) -> Result<usize, getrandom::Error>
{
        let mut buf = [0u8; 8];

        getrandom::fill(&mut buf)?;

        Ok((u64::from_ne_bytes(buf) % max.max(1) as u64) as usize)
}
