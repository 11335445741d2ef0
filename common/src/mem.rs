use crate::misc::IsEven;

use bytemuck::allocation::pod_collect_to_vec;
use bytemuck::cast_slice;

// Image files store words big-endian; everything in memory is host order.
pub fn words_from_be_bytes(input: &[u8]) -> Vec<u16> {
    assert!(input.len().is_even(), "odd byte count {}", input.len());
    let mut words: Vec<u16> = pod_collect_to_vec(input);
    for word in words.iter_mut() {
        *word = u16::from_be(*word);
    }
    words
}

pub fn words_to_be_bytes(input: &[u16]) -> Vec<u8> {
    let words: Vec<u16> = input.iter().map(|word| word.to_be()).collect();
    cast_slice::<u16, u8>(&words).to_vec()
}

// Header word followed by the body, laid out the way an assembler emits it.
pub fn image_bytes(origin: u16, body: &[u16]) -> Vec<u8> {
    let mut words = Vec::with_capacity(body.len() + 1);
    words.push(origin);
    words.extend_from_slice(body);
    words_to_be_bytes(&words)
}
