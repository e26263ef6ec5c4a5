// tests/concurrency_tests.rs
use o2_headers::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_decoding_of_shared_buffer() {
    let message = StackBuilder::new()
        .push(&DataHeader::new(DataDescription::RAWDATA, DataOrigin::MCH, 9, 0))
        .push(&NameHeader::new("shared").unwrap())
        .finish_with_payload(&[7u8; 512]);
    let message = Arc::new(message);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let message = Arc::clone(&message);
            thread::spawn(move || {
                let stack = HeaderStack::new(&message);
                for _ in 0..1000 {
                    let dh = stack.data_header().unwrap().unwrap();
                    assert_eq!(dh.sub_specification, 9);
                    assert_eq!(stack.payload().unwrap().unwrap().len(), 512);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn test_concurrent_rdh_pages() {
    let pages: Vec<u8> = (0..64u16)
        .flat_map(|page| {
            *RawDataHeader::from_fields(&RdhFields {
                version: 1,
                pages_counter: page,
                ..Default::default()
            })
            .as_bytes()
        })
        .collect();
    let pages = Arc::new(pages);

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let pages = Arc::clone(&pages);
            thread::spawn(move || {
                let records = RawDataHeader::cast_slice(&pages).unwrap();
                records
                    .iter()
                    .skip(worker)
                    .step_by(4)
                    .map(|r| r.pages_counter() as u64)
                    .sum::<u64>()
            })
        })
        .collect();

    let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(total, (0..64u64).sum());
}
