pub const OZON_STOCKS: usize = 100;
pub const OZON_PRICES: usize = 1000;
pub const MARKET_STOCKS: usize = 2000;
pub const MARKET_PRICES: usize = 500;

/// Splits `items` into consecutive batches of at most `size` entries.
///
/// The iterator is lazy and can be recreated from the same slice as many times
/// as needed. A zero `size` is treated as one.
pub fn chunk<T>(items: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.max(1))
}
