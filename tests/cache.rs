use gridcast::cache::{BoundedCache, DEFAULT_LIMIT};
use gridcast::error::CacheError;

#[test]
fn new_cache_is_empty_and_lax() {
    let cache: BoundedCache<u32, &str> = BoundedCache::default();
    assert_eq!(cache.size(), Ok(0));
    assert_eq!(cache.limit(), DEFAULT_LIMIT);
    assert!(!cache.is_strict());
    assert!(BoundedCache::<u32, u32>::strict(4).is_strict());
}

#[test]
fn add_then_get_returns_value() {
    let mut cache = BoundedCache::new(8);
    cache.add(1001, "something else").unwrap();
    assert_eq!(cache.get(&1001), Some(&"something else"));
    assert_eq!(cache.get(&1000), None);
    assert_eq!(cache.size(), Ok(1));
}

#[test]
fn strict_mode_rejects_duplicates_and_keeps_original() {
    let mut cache = BoundedCache::strict(8);
    cache.add(0, "foo bar").unwrap();
    assert_eq!(
        cache.add(0, "something else"),
        Err(CacheError::DuplicateKey {
            key: "0".to_string()
        })
    );
    assert_eq!(cache.get(&0), Some(&"foo bar"));
    assert_eq!(cache.size(), Ok(1));
}

#[test]
fn lax_mode_overwrites_without_growing() {
    let mut cache = BoundedCache::new(8);
    cache.add(0, "foo bar").unwrap();
    cache.add(0, "something else").unwrap();
    assert_eq!(cache.get(&0), Some(&"something else"));
    assert_eq!(cache.size(), Ok(1));
}

#[test]
fn size_counts_distinct_keys() {
    for strict in [false, true] {
        let mut cache = if strict {
            BoundedCache::strict(DEFAULT_LIMIT)
        } else {
            BoundedCache::new(DEFAULT_LIMIT)
        };
        for i in 0..20 {
            cache.add(i, i).unwrap();
        }
        assert_eq!(cache.size(), Ok(20), "strict = {strict}");
    }
}

#[test]
fn exceeding_the_limit_clears_everything_first() {
    let mut cache = BoundedCache::strict(4);
    for i in 0..5 {
        cache.add(i, i * 10).unwrap();
    }
    assert_eq!(cache.size(), Ok(1));
    assert_eq!(cache.get(&0), None);
    assert_eq!(cache.get(&3), None);
    assert_eq!(cache.get(&4), Some(&40));
}

#[test]
fn overwrite_at_the_limit_keeps_entries() {
    let mut cache = BoundedCache::new(2);
    cache.add("a", 1).unwrap();
    cache.add("b", 2).unwrap();
    cache.add("a", 3).unwrap();
    assert_eq!(cache.size(), Ok(2));
    assert_eq!(cache.get(&"a"), Some(&3));
    assert_eq!(cache.get(&"b"), Some(&2));
}

#[test]
fn clear_resets_counter() {
    let mut cache = BoundedCache::new(8);
    cache.add(1, 1).unwrap();
    cache.add(2, 2).unwrap();
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.size(), Ok(0));
    assert!(!cache.contains_key(&1));
}

#[test]
fn len_tracks_entries_across_overwrites_and_overflow() {
    let mut cache = BoundedCache::new(3);
    assert_eq!(cache.len(), 0);
    cache.add(1, "a").unwrap();
    cache.add(1, "b").unwrap();
    assert_eq!(cache.len(), 1);
    for key in 2..=4 {
        cache.add(key, "c").unwrap();
    }
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.size(), Ok(cache.len()));
}
