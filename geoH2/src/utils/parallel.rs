use rayon::prelude::*;

/// Maps `items` with rayon when `parallel` is set, sequentially otherwise.
/// Output order always follows input order.
pub fn map_items<T, R, F>(items: &[T], parallel: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if parallel {
        items.par_iter().map(|item| f(item)).collect()
    } else {
        items.iter().map(|item| f(item)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parallel_and_sequential_agree() {
        let items: Vec<u64> = (0..1000).collect();
        let seq = map_items(&items, false, |x| x * x);
        let par = map_items(&items, true, |x| x * x);
        assert_eq!(seq, par);
    }
}
