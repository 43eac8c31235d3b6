//! The closed `VALID_TYPES` whitelist. A `primary_type` (or `secondary_type`,
//! or a segment `doc_type`) outside this set always collapses to `unknown`;
//! that collapse is an invariant, never an error.

/// ~65 procedural-piece types spanning initial petitions, first-instance
/// trial documents, appeals, tribunal output, the administrative phase,
/// probatory attachments, communications, certificates, and an explicit
/// noise ("lixo") group for content that is not a procedural piece at all.
pub const VALID_TYPES: &[&str] = &[
    // Initial petitions
    "peticao-inicial",
    "inicial-eef",
    "inicial-execfiscal",
    "inicial-mandado-seguranca",
    "inicial-acao-civil-publica",
    "inicial-reclamacao-trabalhista",
    // First-instance / trial
    "contestacao",
    "impugnacao",
    "replica",
    "treplica",
    "decisao",
    "decisao-interlocutoria",
    "despacho",
    "sentenca",
    "sentenca-edcl",
    "audiencia-termo",
    "laudo-pericial",
    "manifestacao-autor",
    "manifestacao-reu",
    // Appeal
    "apelacao",
    "contrarrazoes-apelacao",
    "agravo-instrumento",
    "agravo-interno",
    "edcl",
    "recurso-especial",
    "recurso-extraordinario",
    "contrarrazoes-especial",
    "embargos-infringentes",
    "embargos-declaracao",
    // Tribunal
    "acordao",
    "acordao-carf",
    "ementa",
    "voto-vencido",
    "relatorio-voto",
    "pauta-julgamento",
    // Administrative phase
    "processo-administrativo",
    "notificacao-fiscal",
    "auto-infracao",
    "defesa-administrativa",
    "recurso-administrativo",
    "decisao-administrativa",
    // Probatory attachments
    "anexo",
    "documento-comprobatorio",
    "procuracao",
    "substabelecimento",
    "comprovante-pagamento",
    "extrato-bancario",
    "contrato-social",
    "comprovante-residencia",
    // Communications
    "oficio",
    "carta-precatoria",
    "mandado-citacao",
    "mandado-intimacao",
    "notificacao-judicial",
    "edital-citacao",
    // Certificates
    "certidao",
    "certidao-publicacao",
    "certidao-transito-julgado",
    "certidao-objeto-pe",
    // Noise / lixo
    "lixo",
    "capa-processo",
    "folha-rosto",
    "separador",
    "pagina-branco",
    "etiqueta",
];

pub const UNKNOWN: &str = "unknown";

pub fn is_valid_type(candidate: &str) -> bool {
    VALID_TYPES.contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_itself_is_not_in_the_whitelist() {
        assert!(!is_valid_type(UNKNOWN));
    }

    #[test]
    fn whitelist_has_no_duplicates() {
        let mut sorted = VALID_TYPES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), VALID_TYPES.len());
    }

    #[test]
    fn whitelist_is_within_spec_cardinality() {
        assert!(VALID_TYPES.len() >= 55 && VALID_TYPES.len() <= 70);
    }
}
