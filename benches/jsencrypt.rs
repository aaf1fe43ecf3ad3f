#![feature(test)]

extern crate test;

use jsencrypt::{JsEncrypt, Options};
use rand_chacha::{rand_core::SeedableRng, ChaCha8Rng};
use test::Bencher;

const RSA_1024_PRIV_PEM: &str = include_str!("../tests/examples/pkcs1/rsa1024-priv.pem");
const RSA_1024_SPKI_PEM: &str = include_str!("../tests/examples/spki/rsa1024-pub.pem");

fn instance() -> JsEncrypt<ChaCha8Rng> {
    let mut js = JsEncrypt::with_rng(ChaCha8Rng::from_seed([42; 32]), Options::default());
    js.set_key(RSA_1024_PRIV_PEM).unwrap();
    js
}

#[bench]
fn bench_rsa_1024_gen_key(b: &mut Bencher) {
    let mut rng = ChaCha8Rng::from_seed([42; 32]);

    b.iter(|| {
        let mut js = JsEncrypt::with_rng(
            ChaCha8Rng::from_rng(&mut rng).unwrap(),
            Options::default(),
        );
        let key = js.export_public_key().unwrap();
        test::black_box(key);
    });
}

#[bench]
fn bench_resolve_pkcs1_private(b: &mut Bencher) {
    b.iter(|| {
        let res = jsencrypt::resolve(RSA_1024_PRIV_PEM).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_resolve_spki_public(b: &mut Bencher) {
    // tried after both private key structures
    b.iter(|| {
        let res = jsencrypt::resolve(RSA_1024_SPKI_PEM).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_1024_pkcsv1_encrypt(b: &mut Bencher) {
    let mut js = instance();

    b.iter(|| {
        let res = js.encrypt(b"testing").unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_1024_pkcsv1_decrypt(b: &mut Bencher) {
    let mut js = instance();
    let ciphertext = js.encrypt(b"testing").unwrap();

    b.iter(|| {
        let res = js.decrypt(&ciphertext).unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_1024_pkcsv1_sign_blinded(b: &mut Bencher) {
    let mut js = instance();

    b.iter(|| {
        let res = js.sign(b"testing").unwrap();
        test::black_box(res);
    });
}

#[bench]
fn bench_rsa_1024_pkcsv1_verify(b: &mut Bencher) {
    let mut js = instance();
    let signature = js.sign(b"testing").unwrap();

    b.iter(|| {
        let res = js.verify(b"testing", &signature).unwrap();
        test::black_box(res);
    });
}
