//! Certification request generation for the simulated device.
//!
//! The simulator answers `genCsr` with a minimal DER-encoded PKCS#10
//! certification request bound to a fixed placeholder subject and signed
//! with the device key. Hosts treat the bytes as opaque DER; the
//! protocol layer only cares that they hex-encode cleanly.

use ed25519_dalek::{Signer, SigningKey};

/// Organization name used in the placeholder subject.
pub const CSR_ORG_NAME: &str = "Example Inc";
/// Common name used in the placeholder subject.
pub const CSR_COMMON_NAME: &str = "Example Device";

// ASN.1 universal tags used below.
const TAG_INTEGER: u8 = 0x02;
const TAG_BIT_STRING: u8 = 0x03;
const TAG_OID: u8 = 0x06;
const TAG_UTF8_STRING: u8 = 0x0C;
const TAG_SEQUENCE: u8 = 0x30;
const TAG_SET: u8 = 0x31;
const TAG_CONTEXT_0: u8 = 0xA0;

// OID encodings: id-at-organizationName, id-at-commonName, id-Ed25519.
const OID_ORG_NAME: &[u8] = &[0x55, 0x04, 0x0A];
const OID_COMMON_NAME: &[u8] = &[0x55, 0x04, 0x03];
const OID_ED25519: &[u8] = &[0x2B, 0x65, 0x70];

/// Encode a DER length field, short or long form.
fn der_len(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8];
    }
    let bytes = (len as u32).to_be_bytes();
    let skip = bytes.iter().take_while(|&&b| b == 0).count();
    let mut out = vec![0x80 | (bytes.len() - skip) as u8];
    out.extend_from_slice(&bytes[skip..]);
    out
}

/// Wrap `content` in a tag-length-value triple.
fn der_tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(der_len(content.len()));
    out.extend_from_slice(content);
    out
}

/// One AttributeTypeAndValue wrapped in its RelativeDistinguishedName SET.
fn der_rdn(oid: &[u8], value: &str) -> Vec<u8> {
    let mut atv = der_tlv(TAG_OID, oid);
    atv.extend(der_tlv(TAG_UTF8_STRING, value.as_bytes()));
    der_tlv(TAG_SET, &der_tlv(TAG_SEQUENCE, &atv))
}

/// A BIT STRING with zero unused bits.
fn der_bit_string(bytes: &[u8]) -> Vec<u8> {
    let mut content = vec![0x00];
    content.extend_from_slice(bytes);
    der_tlv(TAG_BIT_STRING, &content)
}

/// Build a DER-encoded certification request signed with the device key.
///
/// Layout: CertificationRequestInfo (version 0, placeholder subject,
/// Ed25519 SubjectPublicKeyInfo, empty attributes), the signature
/// algorithm identifier, and the signature over the info sequence.
pub fn build_csr(key: &SigningKey) -> Vec<u8> {
    let mut info = der_tlv(TAG_INTEGER, &[0x00]);

    let mut subject = der_rdn(OID_ORG_NAME, CSR_ORG_NAME);
    subject.extend(der_rdn(OID_COMMON_NAME, CSR_COMMON_NAME));
    info.extend(der_tlv(TAG_SEQUENCE, &subject));

    let mut spki = der_tlv(TAG_SEQUENCE, &der_tlv(TAG_OID, OID_ED25519));
    spki.extend(der_bit_string(key.verifying_key().as_bytes()));
    info.extend(der_tlv(TAG_SEQUENCE, &spki));

    info.extend(der_tlv(TAG_CONTEXT_0, &[]));

    let info = der_tlv(TAG_SEQUENCE, &info);
    let signature = key.sign(&info);

    let mut csr = info;
    csr.extend(der_tlv(TAG_SEQUENCE, &der_tlv(TAG_OID, OID_ED25519)));
    csr.extend(der_bit_string(&signature.to_bytes()));
    der_tlv(TAG_SEQUENCE, &csr)
}
